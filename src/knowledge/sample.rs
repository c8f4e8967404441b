use super::graph::{Graph, Link, LinkKind, Node, NodeCategory, NodeMetadata};

const SAMPLE_NODES: [(&str, &str, NodeCategory, &[&str], &str); 6] = [
    (
        "ai-1",
        "Artificial Intelligence",
        NodeCategory::Concept,
        &["ml-1", "nlp-1"],
        "AI concepts",
    ),
    (
        "ml-1",
        "Machine Learning",
        NodeCategory::Concept,
        &["ai-1", "data-1"],
        "ML algorithms",
    ),
    (
        "nlp-1",
        "Natural Language Processing",
        NodeCategory::Topic,
        &["ai-1", "lang-1"],
        "NLP techniques",
    ),
    (
        "data-1",
        "Data Science",
        NodeCategory::Concept,
        &["ml-1"],
        "Data analysis",
    ),
    (
        "lang-1",
        "Language Models",
        NodeCategory::Topic,
        &["nlp-1"],
        "LLM concepts",
    ),
    (
        "neural-1",
        "Neural Networks",
        NodeCategory::Concept,
        &["ml-1", "ai-1"],
        "Deep learning",
    ),
];

const SAMPLE_LINKS: [(&str, &str, f32); 6] = [
    ("ai-1", "ml-1", 0.8),
    ("ai-1", "nlp-1", 0.7),
    ("ml-1", "data-1", 0.6),
    ("nlp-1", "lang-1", 0.9),
    ("neural-1", "ml-1", 0.8),
    ("neural-1", "ai-1", 0.7),
];

/// The small AI/ML demonstration graph shown before any conversation exists.
pub fn sample_graph() -> Graph {
    let mut graph = Graph::new();

    for (id, label, category, connections, content) in SAMPLE_NODES {
        graph.add_node(Node {
            connections: connections.iter().map(|id| id.to_string()).collect(),
            metadata: Some(NodeMetadata {
                role: "assistant".into(),
                content: content.into(),
                model: "claude".into(),
            }),
            ..Node::new(id, label, category)
        });
    }

    for (source, target, strength) in SAMPLE_LINKS {
        if let Err(error) = graph.add_link(Link::new(source, target, strength, LinkKind::Related)) {
            tracing::warn!("sample link skipped: {error}");
        }
    }

    graph
}
