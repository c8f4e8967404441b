mod export;
mod extract;
mod filter;
mod graph;
mod merge;
mod message;
mod sample;

pub use export::{ExportSnapshot, export_file_name};
pub use extract::{
    ConceptDescriptor, MAX_CONCEPTS, SENTENCE_LENGTH, candidate_phrases, concept_id,
    extract_concepts,
};
pub use filter::NodeFilter;
pub use graph::{
    AddNodeOutcome, Graph, GraphError, GraphView, Link, LinkKind, Node, NodeCategory,
    NodeMetadata,
};
pub use merge::{
    Fragment, LABEL_CHAR_LIMIT, MergeReport, SEQUENTIAL_LINK_STRENGTH, build_fragment,
    fragment_for_message, merge_fragment, merge_message, node_label,
};
pub use message::{Message, Role};
pub use sample::sample_graph;
