//! Unshielded triples.

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::Graph;

/// `x - y - z` with `y` in the middle. Stored with `x < z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub x: NodeId,
    pub y: NodeId,
    pub z: NodeId,
}

impl Triple {
    pub fn new(x: NodeId, y: NodeId, z: NodeId) -> Self {
        if x <= z {
            Self { x, y, z }
        } else {
            Self { x: z, y, z: x }
        }
    }

    /// Render with node names from `graph`.
    pub fn display(&self, graph: &Graph) -> String {
        format!(
            "<{}, {}, {}>",
            graph.name(self.x),
            graph.name(self.y),
            graph.name(self.z)
        )
    }
}

/// How a triple's middle node was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripleType {
    Collider,
    Noncollider,
    Ambiguous,
}
