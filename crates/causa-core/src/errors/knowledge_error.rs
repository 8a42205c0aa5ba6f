//! Background knowledge errors.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("edge {from} --> {to} is both required and forbidden")]
    Conflict { from: String, to: String },

    #[error("{0} cannot be required or forbidden against itself")]
    SelfReference(String),

    #[error("{name} already assigned to tier {tier}")]
    AlreadyTiered { name: String, tier: usize },
}
