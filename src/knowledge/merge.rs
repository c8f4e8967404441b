use super::extract::{ConceptDescriptor, extract_concepts};
use super::graph::{Graph, Link, LinkKind, Node, NodeMetadata};
use super::message::Message;

pub const LABEL_CHAR_LIMIT: usize = 40;
pub const SEQUENTIAL_LINK_STRENGTH: f32 = 0.6;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub nodes_added: usize,
    pub nodes_skipped: usize,
    pub links_added: usize,
    pub links_dropped: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.nodes_added > 0 || self.links_added > 0
    }
}

/// First 40 characters of the message, with `...` when something was cut.
pub fn node_label(content: &str) -> String {
    let mut chars = content.chars();
    let mut label = chars.by_ref().take(LABEL_CHAR_LIMIT).collect::<String>();
    if chars.next().is_some() {
        label.push_str("...");
    }
    label
}

pub fn build_fragment(message: &Message, concepts: &[ConceptDescriptor]) -> Fragment {
    let label = node_label(&message.content);
    let metadata = NodeMetadata {
        role: message.role.label().to_string(),
        content: message.content.clone(),
        model: message.model_or_unknown().to_string(),
    };

    let nodes = concepts
        .iter()
        .map(|concept| Node {
            timestamp: message.timestamp,
            message_id: Some(message.id.clone()),
            metadata: Some(metadata.clone()),
            ..Node::new(concept.id.clone(), label.clone(), concept.category)
        })
        .collect();

    let links = concepts
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some(Link::new(
                from.id.clone(),
                to.id.clone(),
                SEQUENTIAL_LINK_STRENGTH,
                LinkKind::Sequential,
            )),
            _ => None,
        })
        .collect();

    Fragment { nodes, links }
}

pub fn fragment_for_message(message: &Message) -> Fragment {
    build_fragment(message, &extract_concepts(message))
}

/// Unions `fragment` into `graph`. Known node ids are skipped outright; links
/// are appended every time, so re-merging a message duplicates its links.
pub fn merge_fragment(graph: &mut Graph, fragment: Fragment) -> MergeReport {
    let mut report = MergeReport::default();

    for node in fragment.nodes {
        if graph.contains(&node.id) {
            report.nodes_skipped += 1;
            continue;
        }
        graph.add_node(node);
        report.nodes_added += 1;
    }

    for link in fragment.links {
        match graph.add_link(link) {
            Ok(()) => report.links_added += 1,
            Err(error) => {
                tracing::debug!("dropping fragment link: {error}");
                report.links_dropped += 1;
            }
        }
    }

    report
}

pub fn merge_message(graph: &mut Graph, message: &Message) -> MergeReport {
    let report = merge_fragment(graph, fragment_for_message(message));
    tracing::debug!(
        message_id = %message.id,
        nodes_added = report.nodes_added,
        nodes_skipped = report.nodes_skipped,
        links_added = report.links_added,
        "merged message into graph"
    );
    report
}
