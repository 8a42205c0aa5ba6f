//! Endpoint marks and edges.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

impl Endpoint {
    /// Glyph when the mark sits at the left end of an edge.
    pub fn left_glyph(&self) -> char {
        match self {
            Self::Tail => '-',
            Self::Arrow => '<',
            Self::Circle => 'o',
        }
    }

    /// Glyph when the mark sits at the right end of an edge.
    pub fn right_glyph(&self) -> char {
        match self {
            Self::Tail => '-',
            Self::Arrow => '>',
            Self::Circle => 'o',
        }
    }
}

/// Edge classes by their pair of marks, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// `---`
    Undirected,
    /// `-->`
    Directed,
    /// `<->`
    Bidirected,
    /// `o-o`
    Nondirected,
    /// `o->`
    PartiallyOriented,
    /// `o--`
    PartiallyUndirected,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 6] = [
        Self::Undirected,
        Self::Directed,
        Self::Bidirected,
        Self::Nondirected,
        Self::PartiallyOriented,
        Self::PartiallyUndirected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undirected => "---",
            Self::Directed => "-->",
            Self::Bidirected => "<->",
            Self::Nondirected => "o-o",
            Self::PartiallyOriented => "o->",
            Self::PartiallyUndirected => "o--",
        }
    }
}

/// An edge with a mark at each end. `endpoint1` sits at `node1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub node1: NodeId,
    pub node2: NodeId,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
}

impl Edge {
    pub fn new(node1: NodeId, node2: NodeId, endpoint1: Endpoint, endpoint2: Endpoint) -> Self {
        Self {
            node1,
            node2,
            endpoint1,
            endpoint2,
        }
    }

    /// `from --> to`
    pub fn directed(from: NodeId, to: NodeId) -> Self {
        Self::new(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    /// `a --- b`
    pub fn undirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`
    pub fn nondirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// `a <-> b`
    pub fn bidirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    /// `from o-> to`
    pub fn partially_oriented(from: NodeId, to: NodeId) -> Self {
        Self::new(from, to, Endpoint::Circle, Endpoint::Arrow)
    }

    /// Mark at `node`, if `node` is on this edge.
    pub fn endpoint_at(&self, node: NodeId) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.endpoint1)
        } else if node == self.node2 {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.node1 {
            Some(self.node2)
        } else if node == self.node2 {
            Some(self.node1)
        } else {
            None
        }
    }

    /// Same edge written from the other end.
    pub fn reversed(&self) -> Self {
        Self::new(self.node2, self.node1, self.endpoint2, self.endpoint1)
    }

    /// Written with the smaller node id first.
    pub fn normalized(&self) -> Self {
        if self.node1 <= self.node2 {
            *self
        } else {
            self.reversed()
        }
    }

    pub fn kind(&self) -> EdgeKind {
        use Endpoint::*;
        match (self.endpoint1, self.endpoint2) {
            (Tail, Tail) => EdgeKind::Undirected,
            (Tail, Arrow) | (Arrow, Tail) => EdgeKind::Directed,
            (Arrow, Arrow) => EdgeKind::Bidirected,
            (Circle, Circle) => EdgeKind::Nondirected,
            (Circle, Arrow) | (Arrow, Circle) => EdgeKind::PartiallyOriented,
            (Circle, Tail) | (Tail, Circle) => EdgeKind::PartiallyUndirected,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.kind() == EdgeKind::Directed
    }

    /// For a directed edge, the `(tail, head)` pair.
    pub fn direction(&self) -> Option<(NodeId, NodeId)> {
        match (self.endpoint1, self.endpoint2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some((self.node1, self.node2)),
            (Endpoint::Arrow, Endpoint::Tail) => Some((self.node2, self.node1)),
            _ => None,
        }
    }

    /// True if any end carries an arrowhead.
    pub fn has_arrowhead(&self) -> bool {
        self.endpoint1 == Endpoint::Arrow || self.endpoint2 == Endpoint::Arrow
    }

    /// Connector glyphs, e.g. "-->", "o-o", "<->".
    pub fn connector(&self) -> String {
        format!(
            "{}-{}",
            self.endpoint1.left_glyph(),
            self.endpoint2.right_glyph()
        )
    }
}
