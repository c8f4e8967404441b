use eframe::egui::vec2;
use vesserin_graph::knowledge::{
    Graph, GraphError, Link, LinkKind, Message, Node, NodeCategory, NodeFilter, Role,
    merge_message,
};
use vesserin_graph::layout::{LayoutConfig, SimulationPhase};
use vesserin_graph::session::GraphSession;

fn question() -> Message {
    Message::new("m1", Role::User, "What is Machine Learning?")
}

fn answer() -> Message {
    Message::new(
        "m2",
        Role::Assistant,
        "Machine Learning is a subset of AI that learns from data.",
    )
    .with_model("claude")
}

#[test]
fn question_becomes_a_chain_of_question_nodes() {
    let mut graph = Graph::new();
    let report = merge_message(&mut graph, &question());

    assert_eq!(report.nodes_added, 3);
    assert_eq!(report.links_added, 2);

    let ids = graph.nodes().iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["m1-concept-0", "m1-concept-1", "m1-concept-2"]);
    for node in graph.nodes() {
        assert_eq!(node.category, NodeCategory::Question);
        assert_eq!(node.label, "What is Machine Learning?");
        assert_eq!(node.message_id.as_deref(), Some("m1"));
    }

    let pairs = graph
        .links()
        .iter()
        .map(|link| (link.source.as_str(), link.target.as_str(), link.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        [
            ("m1-concept-0", "m1-concept-1", LinkKind::Sequential),
            ("m1-concept-1", "m1-concept-2", LinkKind::Sequential),
        ]
    );
}

#[test]
fn messages_never_link_to_each_other() {
    let mut graph = Graph::new();
    merge_message(&mut graph, &question());
    let report = merge_message(&mut graph, &answer());

    assert_eq!(report.nodes_added, 2);
    assert_eq!(graph.node_count(), 5);
    for link in graph.links() {
        let source_message = graph.node(&link.source).and_then(|node| node.message_id.clone());
        let target_message = graph.node(&link.target).and_then(|node| node.message_id.clone());
        assert_eq!(source_message, target_message);
    }

    let answer_node = graph.node("m2-concept-0").expect("answer node");
    assert_eq!(answer_node.category, NodeCategory::Answer);
    let metadata = answer_node.metadata.as_ref().expect("metadata");
    assert_eq!(metadata.model, "claude");
    assert_eq!(metadata.role, "assistant");
}

#[test]
fn message_without_concepts_leaves_graph_alone() {
    let mut session = GraphSession::new(LayoutConfig::default(), vec2(800.0, 600.0));
    let report = session.ingest(&Message::new("m9", Role::User, "ok so"));

    assert_eq!(report.nodes_added, 0);
    assert!(session.graph().is_empty());
    assert!(session.render_feed().is_empty());
}

#[test]
fn dangling_links_are_rejected_without_side_effects() {
    let mut graph = Graph::new();
    graph.add_node(Node::new("a", "Alpha", NodeCategory::Concept));

    let error = graph
        .add_link(Link::new("a", "missing", 0.5, LinkKind::Related))
        .unwrap_err();
    assert_eq!(
        error,
        GraphError::MissingEndpoint {
            from: "a".into(),
            to: "missing".into(),
            missing: "missing".into(),
        }
    );
    assert_eq!(graph.link_count(), 0);
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn conversation_settles_into_a_stable_layout() {
    let mut session = GraphSession::new(LayoutConfig::default(), vec2(900.0, 700.0));
    session.ingest(&question());
    session.ingest(&answer());
    assert_eq!(session.simulation().phase(), SimulationPhase::Running);

    let mut frames = 0;
    while session.step(1.0 / 60.0) {
        frames += 1;
        assert!(frames < 1_000, "layout never settled");
    }

    assert_eq!(session.simulation().phase(), SimulationPhase::Idle);
    assert!(frames <= 30);
    let feed = session.render_feed();
    assert_eq!(feed.len(), 5);
    assert!(feed.iter().all(|node| node.x.is_finite() && node.y.is_finite()));

    // Filtering keeps the surviving nodes where they were.
    let before = session
        .simulation()
        .position("m2-concept-0")
        .expect("answer node laid out");
    session.set_filter(NodeFilter {
        category: Some(NodeCategory::Answer),
        ..NodeFilter::default()
    });
    assert_eq!(session.render_feed().len(), 2);
    assert_eq!(session.simulation().position("m2-concept-0"), Some(before));
    assert_eq!(session.simulation().position("m1-concept-0"), None);
}

#[test]
fn clearing_resets_everything() {
    let mut session = GraphSession::new(LayoutConfig::default(), vec2(800.0, 600.0));
    session.ingest(&question());
    session.clear();

    assert_eq!(session.graph().node_count(), 0);
    assert_eq!(session.graph().link_count(), 0);
    assert!(session.render_feed().is_empty());
    assert_eq!(session.simulation().phase(), SimulationPhase::Idle);
}
