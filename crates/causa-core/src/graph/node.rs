//! Named variables.

use serde::{Deserialize, Serialize};

/// Dense index of a node within one graph or one variable list.
pub type NodeId = usize;

/// What a variable stands for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    Measured,
    Latent,
    Error,
}

/// A named variable. Two nodes are the same variable iff their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    name: String,
    #[serde(default)]
    node_type: NodeType,
}

impl Node {
    /// A measured variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: NodeType::Measured,
        }
    }

    pub fn latent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: NodeType::Latent,
        }
    }

    pub fn with_type(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_latent(&self) -> bool {
        self.node_type == NodeType::Latent
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Build measured nodes from a list of names.
pub fn nodes_from_names<S: AsRef<str>>(names: &[S]) -> Vec<Node> {
    names.iter().map(|n| Node::new(n.as_ref())).collect()
}
