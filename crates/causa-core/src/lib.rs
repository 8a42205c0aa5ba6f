//! # causa-core
//!
//! Foundation crate for the causa structure-search engine.
//! Defines graphs, knowledge, sepsets, the test/score traits, errors, config,
//! and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod knowledge;
pub mod sepset;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{CausaConfig, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use graph::{Edge, Endpoint, Graph, Node, NodeId, NodeType, Triple};
pub use knowledge::Knowledge;
pub use sepset::SepsetMap;
pub use traits::{IndependenceResult, IndependenceTest, Score, SearchObserver};
