//! Error handling for causa.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod data_error;
pub mod degenerate;
pub mod graph_error;
pub mod knowledge_error;
pub mod search_error;

pub use config_error::ConfigError;
pub use data_error::DataError;
pub use degenerate::DegenerateTestError;
pub use graph_error::GraphError;
pub use knowledge_error::KnowledgeError;
pub use search_error::{SearchError, SearchResult};
