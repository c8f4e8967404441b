use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::graph::{Graph, GraphView, Node, NodeCategory};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Search and type filter backing the graph controls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub search: String,
    pub category: Option<NodeCategory>,
    /// Also accept skim-style fuzzy matches, not only substrings.
    pub fuzzy: bool,
}

impl NodeFilter {
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.category.is_some()
    }

    fn matches_search(&self, matcher: &SkimMatcherV2, node: &Node) -> bool {
        let query = self.search.trim();
        if query.is_empty() {
            return true;
        }

        if node.label.to_lowercase().contains(&query.to_lowercase()) {
            return true;
        }

        self.fuzzy && fuzzy_match_score(matcher, &node.label, query).is_some()
    }

    pub fn apply(&self, graph: &Graph) -> GraphView {
        if !self.is_active() {
            return graph.filter(|_| true);
        }

        let matcher = SkimMatcherV2::default();
        graph.filter(|node| {
            self.category.is_none_or(|category| node.category == category)
                && self.matches_search(&matcher, node)
        })
    }
}
