//! Configuration errors. Raised at construction or setter time, never mid-search.

/// Invalid search parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid depth {depth}: must be >= 0 or -1 for unbounded")]
    InvalidDepth { depth: i32 },

    #[error("invalid max path length {length}: must be >= 0 or -1 for unbounded")]
    InvalidPathLength { length: i32 },

    #[error("significance level {alpha} out of range (0, 1)")]
    InvalidAlpha { alpha: f64 },

    #[error("penalty discount {penalty} must be positive")]
    InvalidPenalty { penalty: f64 },

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown sepset strategy: {0}")]
    UnknownSepsetStrategy(String),

    #[error("algorithm {algorithm} requires a score")]
    MissingScore { algorithm: String },

    #[error("variable mismatch between test and score: {details}")]
    VariableMismatch { details: String },

    #[error("failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
