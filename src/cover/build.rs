//! Karp–Miller 覆盖图构造：BFS 探索 + ω 加速 + 节点合并.
use std::collections::VecDeque;

use thiserror::Error;

use crate::cover::graph::{CoverGraph, NodeTag};
use crate::cover::marking::OmegaMarking;
use crate::net::ids::{NodeId, TransitionId};
use crate::net::structure::Marking;
use crate::net::Net;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("initial marking defines {found} places but the net declares {expected}")]
    InitialMarkingMismatch { expected: usize, found: usize },
}

/// 构造过程中的离散动作, 供注入的观察者消费.
#[derive(Debug, Clone, Copy)]
pub enum BuildEvent<'a> {
    /// 创建 0 号根节点.
    Root { node: NodeId },
    /// 防御性复查命中：更早的节点已持有相同标识.
    TaggedOld { node: NodeId, earlier: NodeId },
    /// 发生结果与既有节点标识相同, 仅添加合并边.
    EdgeAdded {
        src: NodeId,
        dst: NodeId,
        transition: TransitionId,
        accelerated: &'a [NodeId],
    },
    /// 新节点入图, 连同发现它的边.
    NodeCreated {
        src: NodeId,
        node: NodeId,
        transition: TransitionId,
        accelerated: &'a [NodeId],
    },
    /// 没有任何迁移可激发.
    TaggedDeadEnd { node: NodeId },
    /// 节点展开完毕 (Done).
    NodeExpanded { node: NodeId },
}

/// 注入式构造观察者；不影响控制流与结果.
pub trait BuildTrace {
    fn record(&mut self, graph: &CoverGraph, event: BuildEvent<'_>);
}

/// 默认观察者：什么都不记.
pub struct NoTrace;

impl BuildTrace for NoTrace {
    fn record(&mut self, _graph: &CoverGraph, _event: BuildEvent<'_>) {}
}

/// 从初始标识构造覆盖图. 单线程同步执行, 调用返回即完成.
pub fn build_cover_graph(net: &Net, initial: &Marking) -> Result<CoverGraph, BuildError> {
    build_with_trace(net, initial, &mut NoTrace)
}

/// 与 [`build_cover_graph`] 相同的控制流, 每个离散动作之后通知 `trace`.
///
/// 终止性：token 分量取自良基域（ℕ 加顶元 ω）, 每次非恒等的覆盖都令
/// 至少一个分量严格提升, 因而不存在无穷多互异标识的链.
pub fn build_with_trace(
    net: &Net,
    initial: &Marking,
    trace: &mut dyn BuildTrace,
) -> Result<CoverGraph, BuildError> {
    if initial.len() != net.places_len() {
        return Err(BuildError::InitialMarkingMismatch {
            expected: net.places_len(),
            found: initial.len(),
        });
    }

    let mut graph = CoverGraph::with_root(OmegaMarking::from_marking(initial));
    trace.record(&graph, BuildEvent::Root { node: NodeId::ROOT });

    let mut queue = VecDeque::new();
    queue.push_back(NodeId::ROOT);

    while let Some(nid) = queue.pop_front() {
        // 防御性复查：插入端的查重应当让这里永远落空, 命中即为逻辑缺陷.
        let first_holder = graph
            .find_identical(&graph.node(nid).marking)
            .expect("a node always finds at least itself");
        if first_holder != nid {
            debug_assert!(
                false,
                "duplicate marking slipped past insertion dedup: {first_holder:?} vs {nid:?}"
            );
            log::warn!(
                "node {} re-checked as old against node {}",
                nid.raw(),
                first_holder.raw()
            );
            graph.node_mut(nid).tag = NodeTag::Old;
            trace.record(
                &graph,
                BuildEvent::TaggedOld {
                    node: nid,
                    earlier: first_holder,
                },
            );
            continue;
        }

        let chain = graph.ancestor_chain(nid);
        let marking = graph.node(nid).marking.clone();
        let mut any_enabled = false;

        for transition in net.transition_ids() {
            if !marking.enables(net, transition) {
                continue;
            }
            any_enabled = true;

            let mut next = marking.fire(net, transition);

            // 加速可跨多个祖先叠加, 每次作用于当前的 next.
            let mut accelerated = Vec::new();
            for &ancestor in &chain {
                let ancestor_marking = &graph.node(ancestor).marking;
                if next.covers(ancestor_marking) && !next.identical(ancestor_marking) {
                    log::debug!(
                        "acceleration between node {} and ancestor {}",
                        nid.raw(),
                        ancestor.raw()
                    );
                    next = next.accelerate(ancestor_marking);
                    accelerated.push(ancestor);
                }
            }

            match graph.find_identical(&next) {
                Some(existing) => {
                    graph.push_edge(nid, existing, transition);
                    trace.record(
                        &graph,
                        BuildEvent::EdgeAdded {
                            src: nid,
                            dst: existing,
                            transition,
                            accelerated: &accelerated,
                        },
                    );
                }
                None => {
                    let node = graph.push_node(next, nid);
                    graph.push_edge(nid, node, transition);
                    queue.push_back(node);
                    trace.record(
                        &graph,
                        BuildEvent::NodeCreated {
                            src: nid,
                            node,
                            transition,
                            accelerated: &accelerated,
                        },
                    );
                }
            }
        }

        if any_enabled {
            graph.node_mut(nid).tag = NodeTag::Done;
            trace.record(&graph, BuildEvent::NodeExpanded { node: nid });
        } else {
            graph.node_mut(nid).tag = NodeTag::DeadEnd;
            trace.record(&graph, BuildEvent::TaggedDeadEnd { node: nid });
        }
    }

    log::debug!(
        "coverability graph complete: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
