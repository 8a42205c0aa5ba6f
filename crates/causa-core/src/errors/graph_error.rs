//! Graph mutation errors.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("node id {0} out of range")]
    NodeOutOfRange(usize),

    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("edge already present between {a} and {b}")]
    EdgeExists { a: String, b: String },

    #[error("{a} and {b} are not adjacent")]
    NotAdjacent { a: String, b: String },

    #[error("self loop on {0}")]
    SelfLoop(String),

    #[error("graph is not a DAG: {details}")]
    NotADag { details: String },

    #[error("graph is not a CPDAG: {details}")]
    NotACpdag { details: String },

    #[error("graphs are over different nodes: {details}")]
    NodeSetMismatch { details: String },
}
