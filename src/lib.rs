//! Knowledge graph built from chat messages, laid out with a force-directed
//! simulation.
//!
//! The engine lives here; the `vesserin-graph` binary is a thin eframe host
//! around [`session::GraphSession`].

pub mod highlight;
pub mod input;
pub mod knowledge;
pub mod layout;
pub mod session;
pub mod util;
pub mod viewport;
