//! 覆盖图数据结构：节点、边与创建序不变式.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cover::marking::OmegaMarking;
use crate::net::ids::{NodeId, TransitionId};
use crate::net::index_vec::IndexVec;

/// 节点标签的四态闭集：`New → {Done | DeadEnd | Old}`.
///
/// 三个终态只约束标签本身; Done 节点之后仍可能获得新的汇入边.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    New,
    Done,
    Old,
    DeadEnd,
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            NodeTag::New => "new",
            NodeTag::Done => "done",
            NodeTag::Old => "old",
            NodeTag::DeadEnd => "dead-end",
        };
        write!(f, "{tag}")
    }
}

/// `parent` 在节点创建时一次性固定, 记录发现路径;
/// 之后汇入的合并边不改变它.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverNode {
    pub id: NodeId,
    pub marking: OmegaMarking,
    pub tag: NodeTag,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub transition: TransitionId,
}

/// Karp–Miller 覆盖图：节点与边均按创建序存放.
///
/// 不变式：节点 id 稠密 (`0..N-1`)、0 号为根且持有外部给定的初始标识；
/// 插入前先做全表查重, 任一时刻不存在两个标识相同的节点.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverGraph {
    nodes: IndexVec<NodeId, CoverNode>,
    edges: Vec<CoverEdge>,
}

impl CoverGraph {
    pub(crate) fn with_root(marking: OmegaMarking) -> Self {
        let mut nodes = IndexVec::new();
        nodes.push(CoverNode {
            id: NodeId::ROOT,
            marking,
            tag: NodeTag::New,
            parent: None,
        });
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> &CoverNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CoverNode {
        &mut self.nodes[id]
    }

    pub fn root(&self) -> &CoverNode {
        &self.nodes[NodeId::ROOT]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CoverNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &CoverEdge> {
        self.edges.iter()
    }

    /// 按创建序全表扫描, 返回第一个标识完全相同的节点.
    pub fn find_identical(&self, marking: &OmegaMarking) -> Option<NodeId> {
        self.nodes
            .iter_enumerated()
            .find(|(_, node)| node.marking.identical(marking))
            .map(|(id, _)| id)
    }

    /// 节点的发现路径, 根在末位. 根节点的链即其自身——根的后继标识
    /// 要与初始标识比较.
    pub fn ancestor_chain(&self, id: NodeId) -> Vec<NodeId> {
        if id == NodeId::ROOT {
            return vec![NodeId::ROOT];
        }
        let mut chain = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.nodes[ancestor].parent;
        }
        debug_assert_eq!(chain.last(), Some(&NodeId::ROOT));
        chain
    }

    pub(crate) fn push_node(&mut self, marking: OmegaMarking, parent: NodeId) -> NodeId {
        let id = self.nodes.next_idx();
        self.nodes.push(CoverNode {
            id,
            marking,
            tag: NodeTag::New,
            parent: Some(parent),
        });
        id
    }

    pub(crate) fn push_edge(&mut self, src: NodeId, dst: NodeId, transition: TransitionId) {
        debug_assert!(
            !self
                .edges
                .iter()
                .any(|e| e.src == src && e.dst == dst && e.transition == transition),
            "parallel edges must carry distinct transitions"
        );
        self.edges.push(CoverEdge {
            src,
            dst,
            transition,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::marking::Token;
    use crate::net::ids::PlaceId;

    fn marking(values: &[u64]) -> OmegaMarking {
        OmegaMarking::new(IndexVec::from(
            values.iter().map(|&v| Token::Finite(v)).collect::<Vec<_>>(),
        ))
    }

    #[test]
    fn root_has_id_zero_and_no_parent() {
        let graph = CoverGraph::with_root(marking(&[1, 0]));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.root().id, NodeId::ROOT);
        assert_eq!(graph.root().parent, None);
        assert_eq!(graph.root().tag, NodeTag::New);
        assert_eq!(graph.root().marking.tokens(PlaceId::new(0)), Token::Finite(1));
    }

    #[test]
    fn ancestor_chain_walks_parents_root_last() {
        let mut graph = CoverGraph::with_root(marking(&[2]));
        let a = graph.push_node(marking(&[1]), NodeId::ROOT);
        let b = graph.push_node(marking(&[0]), a);

        assert_eq!(graph.ancestor_chain(NodeId::ROOT), vec![NodeId::ROOT]);
        assert_eq!(graph.ancestor_chain(a), vec![NodeId::ROOT]);
        assert_eq!(graph.ancestor_chain(b), vec![a, NodeId::ROOT]);
    }

    #[test]
    fn find_identical_returns_first_in_creation_order() {
        let mut graph = CoverGraph::with_root(marking(&[1]));
        let a = graph.push_node(marking(&[0]), NodeId::ROOT);

        assert_eq!(graph.find_identical(&marking(&[1])), Some(NodeId::ROOT));
        assert_eq!(graph.find_identical(&marking(&[0])), Some(a));
        assert_eq!(graph.find_identical(&marking(&[7])), None);
    }
}
