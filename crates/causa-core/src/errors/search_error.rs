//! Top-level error type for all causa operations.

use super::{ConfigError, DataError, GraphError, KnowledgeError};

/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Convenience alias used across the workspace.
pub type SearchResult<T> = Result<T, SearchError>;
