//! 端到端场景：环、无界、死端、不可复位与确定性重建.
use pncover::cover::{Boundedness, NodeTag, Token, analyze, build_cover_graph};
use pncover::net::{ArcDescription, Net, NetDescription, NodeId, PlaceDescription};

fn description(
    places: &[(&str, u64)],
    transitions: &[&str],
    arcs: &[(&str, &str, i64)],
) -> NetDescription {
    NetDescription {
        name: None,
        places: places
            .iter()
            .map(|&(name, tokens)| PlaceDescription {
                name: name.into(),
                tokens,
            })
            .collect(),
        transitions: transitions.iter().map(|&t| t.into()).collect(),
        arcs: arcs
            .iter()
            .map(|&(source, target, weight)| ArcDescription {
                source: source.into(),
                target: target.into(),
                weight,
            })
            .collect(),
    }
}

fn cycle_net() -> Net {
    description(
        &[("p1", 1), ("p2", 0), ("p3", 0)],
        &["t1", "t2", "t3"],
        &[
            ("p1", "t1", 1),
            ("t1", "p2", 1),
            ("p2", "t2", 1),
            ("t2", "p3", 1),
            ("p3", "t3", 1),
            ("t3", "p1", 1),
        ],
    )
    .build()
    .unwrap()
}

#[test]
fn scenario_cycle_is_bounded_and_live() {
    let net = cycle_net();
    let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();

    let markings: Vec<String> = graph.nodes().map(|n| n.marking.to_string()).collect();
    assert_eq!(markings, vec!["(1,0,0)", "(0,1,0)", "(0,0,1)"]);
    assert!(graph.nodes().all(|n| n.tag == NodeTag::Done));

    let edges: Vec<(u32, u32)> = graph.edges().map(|e| (e.src.raw(), e.dst.raw())).collect();
    assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);

    let report = analyze(&graph, &net);
    assert_eq!(report.boundedness, Boundedness::Bounded(1));
    assert!(report.quasi_live);
    assert!(report.resettable);
    assert!(!report.dead_end);
    assert!(report.live);
}

#[test]
fn scenario_unbounded_producer_gets_omega_node() {
    let net = description(&[("p", 0)], &["t"], &[("t", "p", 1)])
        .build()
        .unwrap();
    let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();

    assert_eq!(graph.node_count(), 2);
    let omega = graph.node(NodeId::new(1));
    assert_eq!(omega.marking.tokens(pncover::net::PlaceId::new(0)), Token::Omega);
    assert!(
        graph.edges().any(|e| e.src == omega.id && e.dst == omega.id),
        "the omega node must close on itself"
    );

    let report = analyze(&graph, &net);
    assert_eq!(report.boundedness, Boundedness::Unbounded);
    assert!(!report.boundedness.is_bounded());
}

#[test]
fn scenario_never_enabled_transition_is_a_dead_end() {
    let net = description(&[("p", 0)], &["t"], &[("p", "t", 1)])
        .build()
        .unwrap();
    let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.root().tag, NodeTag::DeadEnd);

    let report = analyze(&graph, &net);
    assert!(report.dead_end);
    assert!(!report.quasi_live);
    assert!(!report.live);
}

#[test]
fn scenario_one_way_flow_is_not_resettable() {
    let net = description(
        &[("p1", 1), ("p2", 0)],
        &["t1"],
        &[("p1", "t1", 1), ("t1", "p2", 1)],
    )
    .build()
    .unwrap();
    let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();

    assert_eq!(graph.node_count(), 2);
    let report = analyze(&graph, &net);
    assert!(report.quasi_live);
    assert!(!report.resettable);
    assert!(!report.live);
}

#[test]
fn rebuilding_the_same_net_is_deterministic() {
    let net = cycle_net();
    let first = build_cover_graph(&net, &net.initial_marking()).unwrap();
    let second = build_cover_graph(&net, &net.initial_marking()).unwrap();

    let nodes =
        |g: &pncover::CoverGraph| -> Vec<(u32, String, NodeTag)> {
            g.nodes()
                .map(|n| (n.id.raw(), n.marking.to_string(), n.tag))
                .collect()
        };
    let edges = |g: &pncover::CoverGraph| -> Vec<(u32, u32, u32)> {
        g.edges()
            .map(|e| (e.src.raw(), e.dst.raw(), e.transition.raw()))
            .collect()
    };

    assert_eq!(nodes(&first), nodes(&second));
    assert_eq!(edges(&first), edges(&second));
}

#[test]
fn weighted_arcs_shape_the_state_space() {
    // t0 每次从 p0 取一枚、向 p1 产两枚
    let net = description(
        &[("p0", 2), ("p1", 0)],
        &["t0"],
        &[("p0", "t0", 1), ("t0", "p1", 2)],
    )
    .build()
    .unwrap();
    let graph = build_cover_graph(&net, &net.initial_marking()).unwrap();

    let markings: Vec<String> = graph.nodes().map(|n| n.marking.to_string()).collect();
    assert_eq!(markings, vec!["(2,0)", "(1,2)", "(0,4)"]);

    let report = analyze(&graph, &net);
    assert_eq!(report.boundedness, Boundedness::Bounded(4));
    assert!(report.dead_end, "the drained marking enables nothing");
}
