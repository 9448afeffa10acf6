//! 覆盖图导出：经 petgraph 视图渲染 Graphviz DOT.
use std::fs;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;

use crate::cover::graph::CoverGraph;
use crate::net::ids::{NodeId, TransitionId};
use crate::net::index_vec::Idx;
use crate::net::Net;

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn to_dot(graph: &CoverGraph, net: &Net) -> String {
    let mut view: StableGraph<NodeId, TransitionId> = StableGraph::new();
    for node in graph.nodes() {
        let index = view.add_node(node.id);
        debug_assert_eq!(index.index(), node.id.index());
    }
    for edge in graph.edges() {
        view.add_edge(
            NodeIndex::new(edge.src.index()),
            NodeIndex::new(edge.dst.index()),
            edge.transition,
        );
    }

    let edge_attr = |_: &StableGraph<NodeId, TransitionId>,
                     edge: petgraph::stable_graph::EdgeReference<'_, TransitionId>|
     -> String {
        format!("label=\"{}\"", escape(net.transition_name(*edge.weight())))
    };

    let node_attr = |_: &StableGraph<NodeId, TransitionId>,
                     (_, &id): (NodeIndex, &NodeId)|
     -> String {
        let node = graph.node(id);
        format!(
            "label=\"N{}\\n{}\\n{}\"",
            id.raw(),
            escape(&node.marking.to_string()),
            node.tag
        )
    };

    format!(
        "{:?}",
        Dot::with_attr_getters(
            &view,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &edge_attr,
            &node_attr
        )
    )
}

pub fn write_dot<P: AsRef<Path>>(graph: &CoverGraph, net: &Net, path: P) -> std::io::Result<()> {
    let dot = to_dot(graph, net);
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::build::build_cover_graph;
    use crate::net::structure::{Place, Transition};

    #[test]
    fn dot_names_nodes_and_transitions() {
        let mut net = Net::empty();
        let p = net.add_place(Place::new("p", 0));
        let t = net.add_transition(Transition::new("grow"));
        net.set_output_weight(p, t, 1);

        let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();
        let dot = to_dot(&graph, &net);

        assert!(dot.contains("digraph"));
        assert!(dot.contains("N0"));
        assert!(dot.contains("ω"));
        assert!(dot.contains("grow"));
    }
}
