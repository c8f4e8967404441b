use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Concept,
    Topic,
    Question,
    Answer,
}

impl NodeCategory {
    pub const ALL: [Self; 4] = [Self::Concept, Self::Topic, Self::Question, Self::Answer];

    pub fn label(self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Topic => "topic",
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Related,
    Sequential,
    Hierarchical,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Related => "related",
            Self::Sequential => "sequential",
            Self::Hierarchical => "hierarchical",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model: String,
}

impl NodeMetadata {
    /// Copies every non-empty field of `incoming` over `self`.
    fn refresh_from(&mut self, incoming: &NodeMetadata) {
        for (current, fresh) in [
            (&mut self.role, &incoming.role),
            (&mut self.content, &incoming.content),
            (&mut self.model, &incoming.model),
        ] {
            if !fresh.is_empty() {
                current.clone_from(fresh);
            }
        }
    }
}

/// A graph vertex. `x`/`y` stay unset until the layout has placed the node;
/// `fx`/`fy` hold the pin while the node is being dragged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub category: NodeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f32>,
    #[serde(default)]
    pub connections: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            x: None,
            y: None,
            fx: None,
            fy: None,
            connections: Vec::new(),
            timestamp: Utc::now(),
            message_id: None,
            metadata: None,
        }
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.x.zip(self.y)
    }

    pub fn pin(&self) -> Option<(f32, f32)> {
        self.fx.zip(self.fy)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub strength: f32,
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        strength: f32,
        kind: LinkKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength: strength.clamp(0.0, 1.0),
            kind,
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("link {from} -> {to} references missing node {missing}")]
    MissingEndpoint {
        from: String,
        to: String,
        missing: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddNodeOutcome {
    Inserted,
    Merged,
}

/// A projected subset of a [`Graph`]; owns copies, never aliases the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Nodes in insertion order with an id index, plus the link list.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
    links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = *self.index_by_id.get(id)?;
        self.nodes.get_mut(index)
    }

    pub fn add_node(&mut self, node: Node) -> AddNodeOutcome {
        let Some(&index) = self.index_by_id.get(&node.id) else {
            self.index_by_id.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
            return AddNodeOutcome::Inserted;
        };

        let existing = &mut self.nodes[index];
        if existing.label.is_empty() && !node.label.is_empty() {
            existing.label = node.label;
        }
        if let Some(incoming) = node.metadata {
            match existing.metadata.as_mut() {
                Some(metadata) => metadata.refresh_from(&incoming),
                None => existing.metadata = Some(incoming),
            }
        }
        AddNodeOutcome::Merged
    }

    pub fn add_link(&mut self, link: Link) -> Result<(), GraphError> {
        for endpoint in [&link.source, &link.target] {
            if !self.contains(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    from: link.source.clone(),
                    to: link.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }

        self.links.push(link);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index_by_id.clear();
        self.links.clear();
    }

    pub fn set_position(&mut self, id: &str, x: f32, y: f32) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.x = Some(x);
        node.y = Some(y);
        true
    }

    pub fn categories(&self) -> Vec<NodeCategory> {
        let mut seen = Vec::new();
        for node in &self.nodes {
            if !seen.contains(&node.category) {
                seen.push(node.category);
            }
        }
        seen
    }

    /// Nodes passing `predicate` and the links whose endpoints both pass.
    pub fn filter<P>(&self, mut predicate: P) -> GraphView
    where
        P: FnMut(&Node) -> bool,
    {
        let nodes = self
            .nodes
            .iter()
            .filter(|node| predicate(*node))
            .cloned()
            .collect::<Vec<_>>();
        let kept = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let links = self
            .links
            .iter()
            .filter(|link| {
                kept.contains(link.source.as_str()) && kept.contains(link.target.as_str())
            })
            .cloned()
            .collect();

        GraphView { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(id: &str, label: &str) -> Node {
        Node::new(id, label, NodeCategory::Concept)
    }

    #[test]
    fn add_node_is_idempotent_by_identity() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_node(concept("a", "Alpha")), AddNodeOutcome::Inserted);
        assert_eq!(graph.add_node(concept("a", "")), AddNodeOutcome::Merged);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("a").map(|node| node.label.as_str()), Some("Alpha"));
    }

    #[test]
    fn add_node_fills_empty_label_and_refreshes_metadata() {
        let mut graph = Graph::new();
        let mut first = concept("a", "");
        first.metadata = Some(NodeMetadata {
            role: "user".into(),
            content: "old".into(),
            model: "m1".into(),
        });
        graph.add_node(first);

        let mut second = concept("a", "Alpha");
        second.metadata = Some(NodeMetadata {
            role: String::new(),
            content: "new".into(),
            model: String::new(),
        });
        graph.add_node(second);

        let node = graph.node("a").expect("node exists");
        assert_eq!(node.label, "Alpha");
        let metadata = node.metadata.as_ref().expect("metadata kept");
        assert_eq!(metadata.role, "user");
        assert_eq!(metadata.content, "new");
        assert_eq!(metadata.model, "m1");
    }

    #[test]
    fn add_link_rejects_missing_endpoint() {
        let mut graph = Graph::new();
        graph.add_node(concept("a", "Alpha"));

        let error = graph
            .add_link(Link::new("a", "ghost", 0.5, LinkKind::Related))
            .unwrap_err();
        assert_eq!(
            error,
            GraphError::MissingEndpoint {
                from: "a".into(),
                to: "ghost".into(),
                missing: "ghost".into(),
            }
        );
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn duplicate_links_accumulate() {
        let mut graph = Graph::new();
        graph.add_node(concept("a", "Alpha"));
        graph.add_node(concept("b", "Beta"));
        for _ in 0..2 {
            graph
                .add_link(Link::new("a", "b", 0.6, LinkKind::Sequential))
                .expect("both endpoints exist");
        }
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn filter_keeps_induced_links_only() {
        let mut graph = Graph::new();
        graph.add_node(concept("a", "Alpha"));
        graph.add_node(concept("b", "Beta"));
        graph.add_node(Node::new("c", "Gamma", NodeCategory::Topic));
        graph.add_link(Link::new("a", "b", 0.6, LinkKind::Related)).unwrap();
        graph.add_link(Link::new("b", "c", 0.6, LinkKind::Related)).unwrap();

        let view = graph.filter(|node| node.category == NodeCategory::Concept);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.links.len(), 1);
        assert_eq!(view.links[0].target, "b");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut graph = Graph::new();
        graph.add_node(concept("a", "Alpha"));
        graph.add_node(concept("b", "Beta"));
        graph.add_link(Link::new("a", "b", 0.6, LinkKind::Related)).unwrap();

        graph.clear();
        assert!(graph.filter(|_| true).is_empty());
        assert!(!graph.contains("a"));
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("q", "Q", NodeCategory::Question));
        graph.add_node(Node::new("a", "A", NodeCategory::Answer));
        graph.add_node(Node::new("q2", "Q2", NodeCategory::Question));
        assert_eq!(
            graph.categories(),
            vec![NodeCategory::Question, NodeCategory::Answer]
        );
    }

    #[test]
    fn link_strength_is_clamped() {
        assert_eq!(Link::new("a", "b", 1.7, LinkKind::Related).strength, 1.0);
        assert_eq!(Link::new("a", "b", -0.2, LinkKind::Related).strength, 0.0);
    }
}
