//! # pncover — P/T 网覆盖图构造与性质分析
//!
//! 输入一张经过校验的带权 Petri 网（库所、迁移、整数弧权、初始标识）,
//! 以 Karp–Miller 算法构造有限覆盖图, 并在其上回答：网是否有界、
//! 拟活、活、可复位？核心单线程同步、无 I/O；标识一律写时复制,
//! 相互独立的构造可以安全地并行调用.
//!
//! ## 示例
//!
//! ```rust
//! use pncover::cover::{analyze, build_cover_graph};
//! use pncover::net::{Net, Place, Transition};
//!
//! // p1 → t1 → p2 → t2 → p3 → t3 → p1 的三元环
//! let mut net = Net::empty();
//! let places: Vec<_> = ["p1", "p2", "p3"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, name)| net.add_place(Place::new(*name, if i == 0 { 1 } else { 0 })))
//!     .collect();
//! for (i, name) in ["t1", "t2", "t3"].iter().enumerate() {
//!     let t = net.add_transition(Transition::new(*name));
//!     net.set_input_weight(places[i], t, 1);
//!     net.set_output_weight(places[(i + 1) % 3], t, 1);
//! }
//!
//! let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();
//! assert_eq!(graph.node_count(), 3);
//!
//! let report = analyze(&graph, &net);
//! assert!(report.live);
//! ```

pub mod cover;
pub mod net;

pub use cover::{CoverGraph, PropertyReport, analyze, build_cover_graph, build_cover_graph_stepped};
pub use net::{Marking, Net, NetDescription};
