//! 分步构造：为单步回放 UI 生成完整的 (快照, 消息) 历史.
use itertools::Itertools;

use crate::cover::build::{BuildError, BuildEvent, BuildTrace, build_with_trace};
use crate::cover::graph::CoverGraph;
use crate::net::ids::NodeId;
use crate::net::structure::Marking;
use crate::net::Net;

/// 历史的一步：动作完成后的图深拷贝加一条人类可读消息.
///
/// 快照彼此独立, 与后续构造不共享可变结构；消息保证点名受影响的节点
/// id、以 `(v1,v2,...)`（ω 显示为 "ω"）渲染标识、在相关时给出迁移名,
/// 并说明是否/针对哪个祖先发生了加速. 具体措辞不属于契约.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub graph: CoverGraph,
    pub message: String,
}

struct HistoryRecorder<'a> {
    net: &'a Net,
    entries: Vec<HistoryEntry>,
}

impl BuildTrace for HistoryRecorder<'_> {
    fn record(&mut self, graph: &CoverGraph, event: BuildEvent<'_>) {
        let message = match event {
            BuildEvent::Root { node } => format!(
                "created root node N{} with initial marking {}",
                node.raw(),
                graph.node(node).marking
            ),
            BuildEvent::TaggedOld { node, earlier } => format!(
                "node N{} tagged old: marking {} already present at node N{}",
                node.raw(),
                graph.node(node).marking,
                earlier.raw()
            ),
            BuildEvent::EdgeAdded {
                src,
                dst,
                transition,
                accelerated,
            } => format!(
                "transition {} from node N{} reaches existing node N{} {}{}",
                self.net.transition_name(transition),
                src.raw(),
                dst.raw(),
                graph.node(dst).marking,
                acceleration_note(accelerated)
            ),
            BuildEvent::NodeCreated {
                src,
                node,
                transition,
                accelerated,
            } => format!(
                "transition {} from node N{} creates node N{} with marking {}{}",
                self.net.transition_name(transition),
                src.raw(),
                node.raw(),
                graph.node(node).marking,
                acceleration_note(accelerated)
            ),
            BuildEvent::TaggedDeadEnd { node } => format!(
                "node N{} tagged dead-end: no transition enabled at {}",
                node.raw(),
                graph.node(node).marking
            ),
            BuildEvent::NodeExpanded { node } => {
                format!("node N{} expansion complete", node.raw())
            }
        };
        self.entries.push(HistoryEntry {
            graph: graph.clone(),
            message,
        });
    }
}

fn acceleration_note(accelerated: &[NodeId]) -> String {
    if accelerated.is_empty() {
        " (no acceleration)".to_string()
    } else {
        format!(
            ", accelerated against ancestor {}",
            accelerated.iter().map(|id| format!("N{}", id.raw())).join(", ")
        )
    }
}

/// 与 [`build_cover_graph`](crate::cover::build_cover_graph) 同一控制流,
/// 额外急切生成整条历史——没有惰性或交错可见性.
pub fn build_cover_graph_stepped(
    net: &Net,
    initial: &Marking,
) -> Result<(CoverGraph, Vec<HistoryEntry>), BuildError> {
    let mut recorder = HistoryRecorder {
        net,
        entries: Vec::new(),
    };
    let graph = build_with_trace(net, initial, &mut recorder)?;
    Ok((graph, recorder.entries))
}
