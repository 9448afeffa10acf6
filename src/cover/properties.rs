//! 覆盖图性质分析：有界性、拟活性、可复位性、死端与活性.
//!
//! 所有判定只读取构造完毕的覆盖图与网声明的迁移全集;
//! 叙事仅走 `log`, 不影响控制流与结果.
use std::fmt;

use rustc_hash::FxHashSet;

use crate::cover::graph::{CoverGraph, NodeTag};
use crate::net::ids::{NodeId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::Weight;
use crate::net::Net;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundedness {
    /// 有界, 附全图观察到的最大有限 token 数.
    Bounded(Weight),
    Unbounded,
}

impl Boundedness {
    pub fn is_bounded(self) -> bool {
        matches!(self, Boundedness::Bounded(_))
    }
}

impl fmt::Display for Boundedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundedness::Bounded(bound) => write!(f, "bounded (max tokens {bound})"),
            Boundedness::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// 任一节点出现 ω 即无界；否则给出最大有限 token 数.
pub fn boundedness(graph: &CoverGraph) -> Boundedness {
    let mut max_tokens = 0;
    for node in graph.nodes() {
        if node.marking.has_omega() {
            return Boundedness::Unbounded;
        }
        max_tokens = max_tokens.max(node.marking.max_finite());
    }
    Boundedness::Bounded(max_tokens)
}

fn fired_transitions(graph: &CoverGraph) -> FxHashSet<TransitionId> {
    graph.edges().map(|edge| edge.transition).collect()
}

/// 每个声明迁移是否至少在图中发生过一次.
pub fn quasi_live_transitions(graph: &CoverGraph, net: &Net) -> IndexVec<TransitionId, bool> {
    let fired = fired_transitions(graph);
    IndexVec::from(
        net.transition_ids()
            .map(|transition| fired.contains(&transition))
            .collect::<Vec<_>>(),
    )
}

/// 拟活：边上出现的迁移标签集合等于声明的迁移全集.
pub fn is_quasi_live(graph: &CoverGraph, net: &Net) -> bool {
    let fired = fired_transitions(graph);
    log::debug!(
        "quasi-liveness: {} of {} transitions fired",
        fired.len(),
        net.transitions_len()
    );
    fired.len() == net.transitions_len()
}

/// 可复位：沿反向邻接从根出发, 每个节点都可达
/// （即每个可达状态都能回到初始标识）.
pub fn is_resettable(graph: &CoverGraph) -> bool {
    let mut reverse: IndexVec<NodeId, Vec<NodeId>> =
        IndexVec::from_elem(Vec::new(), graph.node_count());
    for edge in graph.edges() {
        reverse[edge.dst].push(edge.src);
    }

    let mut visited: IndexVec<NodeId, bool> = IndexVec::from_elem(false, graph.node_count());
    let mut stack = vec![NodeId::ROOT];
    let mut seen = 0usize;

    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        seen += 1;
        stack.extend(reverse[node].iter().copied());
    }

    log::debug!("resettability: {seen} of {} nodes reach the root", graph.node_count());
    seen == graph.node_count()
}

pub fn has_dead_end(graph: &CoverGraph) -> bool {
    graph.nodes().any(|node| node.tag == NodeTag::DeadEnd)
}

/// 从 `start` 沿前向边可达的迁移标签集合（按起点记忆化的一次遍历）.
fn reachable_transitions_from(
    start: NodeId,
    forward: &IndexVec<NodeId, Vec<(NodeId, TransitionId)>>,
) -> FxHashSet<TransitionId> {
    let mut visited: IndexVec<NodeId, bool> = IndexVec::from_elem(false, forward.len());
    let mut fired = FxHashSet::default();
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        for &(next, transition) in &forward[node] {
            fired.insert(transition);
            stack.push(next);
        }
    }
    fired
}

fn forward_adjacency(graph: &CoverGraph) -> IndexVec<NodeId, Vec<(NodeId, TransitionId)>> {
    let mut forward: IndexVec<NodeId, Vec<(NodeId, TransitionId)>> =
        IndexVec::from_elem(Vec::new(), graph.node_count());
    for edge in graph.edges() {
        forward[edge.src].push((edge.dst, edge.transition));
    }
    forward
}

/// 单个迁移活 ⟺ 它出现在每个节点的前向可达集中.
/// 死端节点的可达集为空, 因而自动否定所有迁移.
pub fn live_transitions(graph: &CoverGraph, net: &Net) -> IndexVec<TransitionId, bool> {
    let forward = forward_adjacency(graph);
    let mut live: IndexVec<TransitionId, bool> =
        IndexVec::from_elem(true, net.transitions_len());
    for node in forward.indices() {
        let reachable = reachable_transitions_from(node, &forward);
        for transition in net.transition_ids() {
            if !reachable.contains(&transition) {
                live[transition] = false;
            }
        }
    }
    live
}

/// 活性：存在死端直接否定; 拟活 ∧ 可复位是充分捷径; 否则回退为
/// 逐节点前向遍历——每个声明迁移必须在每个节点的可达集中.
///
/// 回退最坏 O(V·(V+E)); 覆盖图远小于底层（可能无穷的）状态空间, 可接受.
pub fn is_live(graph: &CoverGraph, net: &Net) -> bool {
    if has_dead_end(graph) {
        log::debug!("liveness: dead-end present, not live");
        return false;
    }

    if is_quasi_live(graph, net) && is_resettable(graph) {
        log::debug!("liveness: quasi-live and resettable, live by shortcut");
        return true;
    }

    let forward = forward_adjacency(graph);
    for node in forward.indices() {
        let reachable = reachable_transitions_from(node, &forward);
        for transition in net.transition_ids() {
            if !reachable.contains(&transition) {
                log::debug!(
                    "liveness: transition {} unreachable from node {}",
                    net.transition_name(transition),
                    node.index()
                );
                return false;
            }
        }
    }
    true
}

/// 一次性汇总全部性质.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyReport {
    pub boundedness: Boundedness,
    pub quasi_live: bool,
    pub resettable: bool,
    pub dead_end: bool,
    pub live: bool,
}

pub fn analyze(graph: &CoverGraph, net: &Net) -> PropertyReport {
    PropertyReport {
        boundedness: boundedness(graph),
        quasi_live: is_quasi_live(graph, net),
        resettable: is_resettable(graph),
        dead_end: has_dead_end(graph),
        live: is_live(graph, net),
    }
}

impl fmt::Display for PropertyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "boundedness: {}", self.boundedness)?;
        writeln!(f, "quasi-live:  {}", self.quasi_live)?;
        writeln!(f, "resettable:  {}", self.resettable)?;
        writeln!(f, "dead-end:    {}", self.dead_end)?;
        write!(f, "live:        {}", self.live)
    }
}
