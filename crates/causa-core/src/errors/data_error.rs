//! Dataset construction errors.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("column {name} has {actual} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("too few samples: {samples} (need at least {required})")]
    TooFewSamples { samples: usize, required: usize },

    #[error("duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("non-finite value in column {name} at row {row}")]
    NonFinite { name: String, row: usize },

    #[error("dataset has no variables")]
    Empty,
}
