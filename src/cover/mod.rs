//! # 覆盖图（Karp–Miller）构造与性质分析
//!
//! 在 `ℕ ∪ {ω}` 的标识域上对 [`crate::net::Net`] 做 BFS 探索：发生结果若
//! 严格覆盖某个祖先标识, 增长分量被提升为 ω（加速）, 从而在有限图上
//! 过近似可能无穷的可达集. 构造完成后可在图上判定有界性、拟活性、
//! 可复位性与活性, 而无需枚举底层状态空间.

pub mod build;
pub mod export;
pub mod graph;
pub mod marking;
pub mod properties;
pub mod stepped;

pub use build::{BuildError, BuildEvent, BuildTrace, NoTrace, build_cover_graph, build_with_trace};
pub use export::{to_dot, write_dot};
pub use graph::{CoverEdge, CoverGraph, CoverNode, NodeTag};
pub use marking::{OmegaMarking, Token};
pub use properties::{
    Boundedness, PropertyReport, analyze, boundedness, has_dead_end, is_live, is_quasi_live,
    is_resettable, live_transitions, quasi_live_transitions,
};
pub use stepped::{HistoryEntry, build_cover_graph_stepped};
