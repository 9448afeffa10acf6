//! 分步构造历史的契约测试：条目数、快照独立性与消息内容.
use pncover::cover::{build_cover_graph, build_cover_graph_stepped};
use pncover::net::{Net, Place, Transition};

fn cycle_net() -> Net {
    let mut net = Net::empty();
    let p1 = net.add_place(Place::new("p1", 1));
    let p2 = net.add_place(Place::new("p2", 0));
    let p3 = net.add_place(Place::new("p3", 0));
    let t1 = net.add_transition(Transition::new("t1"));
    let t2 = net.add_transition(Transition::new("t2"));
    let t3 = net.add_transition(Transition::new("t3"));
    net.set_input_weight(p1, t1, 1);
    net.set_output_weight(p2, t1, 1);
    net.set_input_weight(p2, t2, 1);
    net.set_output_weight(p3, t2, 1);
    net.set_input_weight(p3, t3, 1);
    net.set_output_weight(p1, t3, 1);
    net
}

#[test]
fn history_has_one_entry_per_action() {
    let net = cycle_net();
    let initial = net.initial_marking();
    let (graph, history) = build_cover_graph_stepped(&net, &initial).unwrap();

    // 根 1 条 + 新节点 2 条 + 合并边 1 条 + Done 3 条
    assert_eq!(history.len(), 7);

    // 最终快照与一次性构造完全一致
    let plain = build_cover_graph(&net, &initial).unwrap();
    let last = &history.last().unwrap().graph;
    assert_eq!(last.node_count(), plain.node_count());
    assert_eq!(last.edge_count(), plain.edge_count());

    let markings = |g: &pncover::CoverGraph| -> Vec<String> {
        g.nodes().map(|n| n.marking.to_string()).collect()
    };
    assert_eq!(markings(last), markings(&plain));
}

#[test]
fn snapshots_are_independent_deep_copies() {
    let net = cycle_net();
    let (_, history) = build_cover_graph_stepped(&net, &net.initial_marking()).unwrap();

    // 早期快照不随后续构造改变
    assert_eq!(history[0].graph.node_count(), 1);
    assert_eq!(history[0].graph.edge_count(), 0);
    assert_eq!(history[0].graph.root().marking.to_string(), "(1,0,0)");

    // 节点数沿历史单调不减
    let counts: Vec<usize> = history.iter().map(|e| e.graph.node_count()).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn messages_name_nodes_markings_and_transitions() {
    let net = cycle_net();
    let (_, history) = build_cover_graph_stepped(&net, &net.initial_marking()).unwrap();

    assert!(history[0].message.contains("N0"));
    assert!(history[0].message.contains("(1,0,0)"));

    let creation = &history[1].message;
    assert!(creation.contains("t1"));
    assert!(creation.contains("N1"));
    assert!(creation.contains("(0,1,0)"));
    assert!(creation.contains("no acceleration"));

    // 合并边指回根
    assert!(history.iter().any(|e| {
        e.message.contains("t3") && e.message.contains("N2") && e.message.contains("N0")
    }));
}

#[test]
fn acceleration_is_reported_with_its_ancestor() {
    let mut net = Net::empty();
    let p = net.add_place(Place::new("p", 0));
    let t = net.add_transition(Transition::new("t"));
    net.set_output_weight(p, t, 1);

    let (graph, history) = build_cover_graph_stepped(&net, &net.initial_marking()).unwrap();
    assert_eq!(graph.node_count(), 2);

    let widened = history
        .iter()
        .find(|e| e.message.contains("N1") && e.message.contains("ω"))
        .expect("the widened node must be announced");
    assert!(widened.message.contains("accelerated against ancestor N0"));
    assert!(widened.message.contains("(ω)"));
}
