use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::graph::{GraphView, Link, Node};

/// One-shot dump of the currently displayed (filtered) graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub export_date: String,
}

impl ExportSnapshot {
    pub fn new(view: GraphView, exported_at: DateTime<Utc>) -> Self {
        Self {
            nodes: view.nodes,
            links: view.links,
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize graph export")
    }

    /// Writes the snapshot as `knowledge-graph-YYYY-MM-DD.json` inside `dir`.
    pub fn write_to_dir(&self, dir: &Path, exported_at: DateTime<Utc>) -> Result<PathBuf> {
        let path = dir.join(export_file_name(exported_at));
        let json = self.to_json_pretty()?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write graph export to {}", path.display()))?;
        tracing::info!("exported {} nodes to {}", self.nodes.len(), path.display());
        Ok(path)
    }
}

pub fn export_file_name(exported_at: DateTime<Utc>) -> String {
    format!("knowledge-graph-{}.json", exported_at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;
    use crate::knowledge::{Graph, LinkKind, NodeCategory};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap()
    }

    #[test]
    fn snapshot_serializes_with_original_field_names() {
        let mut graph = Graph::new();
        let mut node = Node::new("a", "Alpha", NodeCategory::Topic);
        node.timestamp = fixed_time();
        graph.add_node(node);
        graph.add_node(Node::new("b", "Beta", NodeCategory::Concept));
        graph
            .add_link(Link::new("a", "b", 0.9, LinkKind::Hierarchical))
            .unwrap();

        let snapshot = ExportSnapshot::new(graph.filter(|_| true), fixed_time());
        let value: Value = serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["exportDate"], "2024-03-09T14:30:05.000Z");
        assert_eq!(value["nodes"][0]["type"], "topic");
        assert_eq!(value["links"][0]["type"], "hierarchical");
        assert!(value["nodes"][0].get("messageId").is_none());
    }

    #[test]
    fn file_name_uses_export_day() {
        assert_eq!(export_file_name(fixed_time()), "knowledge-graph-2024-03-09.json");
    }

    #[test]
    fn writes_into_directory() {
        let dir = std::env::temp_dir().join(format!("vesserin-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let snapshot = ExportSnapshot::new(GraphView::default(), fixed_time());
        let path = snapshot.write_to_dir(&dir, fixed_time()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let parsed: ExportSnapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, snapshot);

        fs::remove_dir_all(&dir).unwrap();
    }
}
