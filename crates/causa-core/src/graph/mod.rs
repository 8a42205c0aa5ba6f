//! Mixed graphs with Tail / Arrow / Circle endpoint marks.
//!
//! Node ids are dense and follow insertion order. Adjacency is kept in ordered
//! maps so every iteration (neighbors, edges, triples) is deterministic for a
//! fixed node ordering.

pub mod endpoint;
pub mod node;
pub mod paths;
pub mod triple;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

pub use endpoint::{Edge, EdgeKind, Endpoint};
pub use node::{nodes_from_names, Node, NodeId, NodeType};
pub use triple::{Triple, TripleType};

use crate::errors::GraphError;

/// A graph over named nodes with at most one edge per node pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    /// `marks[a][b]` is the endpoint at `b` on the edge `a *-* b`.
    marks: Vec<BTreeMap<NodeId, Endpoint>>,
}

impl Graph {
    /// An empty graph with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph over `nodes` with no edges.
    pub fn with_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// The complete undirected graph over `nodes`.
    pub fn complete_undirected(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut graph = Self::with_nodes(nodes)?;
        let n = graph.node_count();
        for a in 0..n {
            for b in (a + 1)..n {
                graph.add_edge(Edge::undirected(a, b))?;
            }
        }
        Ok(graph)
    }

    /// Same nodes, no edges.
    pub fn empty_copy(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            index: self.index.clone(),
            marks: vec![BTreeMap::new(); self.nodes.len()],
        }
    }

    // --- Nodes ---

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.index.contains_key(node.name()) {
            return Err(GraphError::DuplicateNode(node.name().to_string()));
        }
        let id = self.nodes.len();
        self.index.insert(node.name().to_string(), id);
        self.nodes.push(node);
        self.marks.push(BTreeMap::new());
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes[id].name()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Like `node_id`, but an unknown name is an error.
    pub fn require_node(&self, name: &str) -> Result<NodeId, GraphError> {
        self.node_id(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    pub fn node_ids(&self) -> std::ops::Range<NodeId> {
        0..self.nodes.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.name().to_string()).collect()
    }

    // --- Edges ---

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        self.check_id(edge.node1)?;
        self.check_id(edge.node2)?;
        if edge.node1 == edge.node2 {
            return Err(GraphError::SelfLoop(self.name(edge.node1).to_string()));
        }
        if self.is_adjacent(edge.node1, edge.node2) {
            return Err(GraphError::EdgeExists {
                a: self.name(edge.node1).to_string(),
                b: self.name(edge.node2).to_string(),
            });
        }
        self.marks[edge.node1].insert(edge.node2, edge.endpoint2);
        self.marks[edge.node2].insert(edge.node1, edge.endpoint1);
        Ok(())
    }

    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.add_edge(Edge::directed(from, to))
    }

    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(Edge::undirected(a, b))
    }

    pub fn add_nondirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(Edge::nondirected(a, b))
    }

    pub fn add_bidirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(Edge::bidirected(a, b))
    }

    /// Add an edge by node names.
    pub fn add_edge_by_name(
        &mut self,
        a: &str,
        b: &str,
        at_a: Endpoint,
        at_b: Endpoint,
    ) -> Result<(), GraphError> {
        let a = self.require_node(a)?;
        let b = self.require_node(b)?;
        self.add_edge(Edge::new(a, b, at_a, at_b))
    }

    /// Remove the edge between `a` and `b`. Returns whether one existed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a >= self.marks.len() || b >= self.marks.len() {
            return false;
        }
        let removed = self.marks[a].remove(&b).is_some();
        self.marks[b].remove(&a);
        removed
    }

    /// Drop every edge, keep the nodes.
    pub fn remove_all_edges(&mut self) {
        for m in &mut self.marks {
            m.clear();
        }
    }

    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.marks.get(a).is_some_and(|m| m.contains_key(&b))
    }

    /// Neighbors of `a` in ascending id order.
    pub fn adjacent_nodes(&self, a: NodeId) -> Vec<NodeId> {
        self.marks[a].keys().copied().collect()
    }

    pub fn adjacent_iter(&self, a: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.marks[a].keys().copied()
    }

    pub fn degree(&self, a: NodeId) -> usize {
        self.marks[a].len()
    }

    /// Mark at `b` on the edge `a *-* b`.
    pub fn endpoint(&self, a: NodeId, b: NodeId) -> Option<Endpoint> {
        self.marks.get(a).and_then(|m| m.get(&b).copied())
    }

    /// Set the mark at `b` on the edge `a *-* b`.
    pub fn set_endpoint(&mut self, a: NodeId, b: NodeId, mark: Endpoint) -> Result<(), GraphError> {
        match self.marks.get_mut(a).and_then(|m| m.get_mut(&b)) {
            Some(slot) => {
                *slot = mark;
                Ok(())
            }
            None => Err(self.not_adjacent(a, b)),
        }
    }

    /// Replace both marks of the edge between `a` and `b`.
    pub fn set_edge(&mut self, a: NodeId, b: NodeId, at_a: Endpoint, at_b: Endpoint) -> Result<(), GraphError> {
        self.set_endpoint(a, b, at_b)?;
        self.set_endpoint(b, a, at_a)
    }

    /// Orient `from --> to`. The nodes must already be adjacent.
    pub fn orient(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.set_edge(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<Edge> {
        let at_b = self.endpoint(a, b)?;
        let at_a = self.endpoint(b, a)?;
        Some(Edge::new(a, b, at_a, at_b))
    }

    /// All edges, normalized, in ascending `(node1, node2)` order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::with_capacity(self.num_edges());
        for (a, m) in self.marks.iter().enumerate() {
            for (&b, &at_b) in m.range((a + 1)..) {
                let at_a = self.marks[b][&a];
                out.push(Edge::new(a, b, at_a, at_b));
            }
        }
        out
    }

    pub fn num_edges(&self) -> usize {
        self.marks.iter().map(|m| m.len()).sum::<usize>() / 2
    }

    /// Set every endpoint of every edge to `mark`.
    pub fn reorient_all_with(&mut self, mark: Endpoint) {
        for m in &mut self.marks {
            for slot in m.values_mut() {
                *slot = mark;
            }
        }
    }

    // --- Orientation queries ---

    /// `a --> b`
    pub fn is_directed_from_to(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(b, a) == Some(Endpoint::Tail) && self.endpoint(a, b) == Some(Endpoint::Arrow)
    }

    pub fn is_parent_of(&self, a: NodeId, b: NodeId) -> bool {
        self.is_directed_from_to(a, b)
    }

    /// `a --- b`
    pub fn is_undirected_from_to(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(b, a) == Some(Endpoint::Tail) && self.endpoint(a, b) == Some(Endpoint::Tail)
    }

    /// `a <-> b`
    pub fn is_bidirected(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(b, a) == Some(Endpoint::Arrow) && self.endpoint(a, b) == Some(Endpoint::Arrow)
    }

    /// `a *-> b <-* c`
    pub fn is_def_collider(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(c, b) == Some(Endpoint::Arrow)
    }

    pub fn parents(&self, b: NodeId) -> Vec<NodeId> {
        self.adjacent_iter(b)
            .filter(|&a| self.is_directed_from_to(a, b))
            .collect()
    }

    pub fn children(&self, a: NodeId) -> Vec<NodeId> {
        self.adjacent_iter(a)
            .filter(|&b| self.is_directed_from_to(a, b))
            .collect()
    }

    /// True if every edge is directed.
    pub fn is_fully_directed(&self) -> bool {
        self.edges().iter().all(Edge::is_directed)
    }

    // --- Paths ---

    /// Directed path `from ~~> to` of length >= 1.
    pub fn exists_directed_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.node_count()];
        let mut stack = self.children(from);
        while let Some(n) = stack.pop() {
            if n == to {
                return true;
            }
            if std::mem::replace(&mut visited[n], true) {
                continue;
            }
            stack.extend(self.children(n));
        }
        false
    }

    /// `a` is an ancestor of `b` (every node is its own ancestor).
    pub fn is_ancestor_of(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.exists_directed_path(a, b)
    }

    /// All ancestors of any node in `of`, including the nodes themselves.
    pub fn ancestors_of(&self, of: &[NodeId]) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<NodeId> = of.to_vec();
        while let Some(n) = stack.pop() {
            if out.insert(n) {
                stack.extend(self.parents(n));
            }
        }
        out
    }

    /// Directed projection as a petgraph graph; node `i` maps to `NodeIndex(i)`.
    pub fn directed_projection(&self) -> DiGraph<NodeId, ()> {
        let mut g = DiGraph::with_capacity(self.node_count(), self.num_edges());
        for id in self.node_ids() {
            g.add_node(id);
        }
        for edge in self.edges() {
            if let Some((from, to)) = edge.direction() {
                g.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
            }
        }
        g
    }

    /// No directed cycle among the directed edges.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.directed_projection())
    }

    /// A DAG: every edge directed and no directed cycle.
    pub fn is_dag(&self) -> bool {
        self.is_fully_directed() && self.is_acyclic()
    }

    /// Topological order of a DAG.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        if !self.is_fully_directed() {
            return Err(GraphError::NotADag {
                details: "graph has non-directed edges".to_string(),
            });
        }
        let g = self.directed_projection();
        toposort(&g, None)
            .map(|order| order.into_iter().map(|ix| g[ix]).collect())
            .map_err(|cycle| GraphError::NotADag {
                details: format!("cycle through {}", self.name(g[cycle.node_id()])),
            })
    }

    // --- Triples ---

    /// Unshielded triples ordered by middle node, then `x`, then `z`.
    pub fn unshielded_triples(&self) -> Vec<Triple> {
        let mut out = Vec::new();
        for y in self.node_ids() {
            let adj = self.adjacent_nodes(y);
            for (i, &x) in adj.iter().enumerate() {
                for &z in &adj[i + 1..] {
                    if !self.is_adjacent(x, z) {
                        out.push(Triple::new(x, y, z));
                    }
                }
            }
        }
        out
    }

    /// Unshielded colliders `x *-> y <-* z`.
    pub fn unshielded_colliders(&self) -> Vec<Triple> {
        self.unshielded_triples()
            .into_iter()
            .filter(|t| self.is_def_collider(t.x, t.y, t.z))
            .collect()
    }

    // --- Name-based views ---

    /// Copy of this graph over `nodes` (matched by name), keeping edges whose
    /// endpoints both appear in `nodes`.
    pub fn project_onto(&self, nodes: &[Node]) -> Result<Graph, GraphError> {
        let mut out = Graph::with_nodes(nodes.to_vec())?;
        for edge in self.edges() {
            let a = out.node_id(self.name(edge.node1));
            let b = out.node_id(self.name(edge.node2));
            if let (Some(a), Some(b)) = (a, b) {
                out.add_edge(Edge::new(a, b, edge.endpoint1, edge.endpoint2))?;
            }
        }
        Ok(out)
    }

    /// Edge between two named nodes.
    pub fn edge_by_name(&self, a: &str, b: &str) -> Option<Edge> {
        self.edge(self.node_id(a)?, self.node_id(b)?)
    }

    /// Edge rendered as `A --> B` with the smaller id first.
    pub fn edge_string(&self, edge: &Edge) -> String {
        format!(
            "{} {} {}",
            self.name(edge.node1),
            edge.connector(),
            self.name(edge.node2)
        )
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self
                .edges()
                .iter()
                .map(|e| EdgeRecord {
                    node1: self.name(e.node1).to_string(),
                    node2: self.name(e.node2).to_string(),
                    endpoint1: e.endpoint1,
                    endpoint2: e.endpoint2,
                })
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::with_nodes(snapshot.nodes.clone())?;
        for e in &snapshot.edges {
            graph.add_edge_by_name(&e.node1, &e.node2, e.endpoint1, e.endpoint2)?;
        }
        Ok(graph)
    }

    fn check_id(&self, id: NodeId) -> Result<(), GraphError> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange(id))
        }
    }

    fn not_adjacent(&self, a: NodeId, b: NodeId) -> GraphError {
        let label = |id: NodeId| {
            self.nodes
                .get(id)
                .map(|n| n.name().to_string())
                .unwrap_or_else(|| format!("#{id}"))
        };
        GraphError::NotAdjacent {
            a: label(a),
            b: label(b),
        }
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Nodes:")?;
        writeln!(f, "{}", self.names().join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (i, edge) in self.edges().iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, self.edge_string(edge))?;
        }
        Ok(())
    }
}

/// Serializable, name-keyed form of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub node1: String,
    pub node2: String,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Graph {
        Graph::with_nodes(nodes_from_names(&["A", "B", "C"])).unwrap()
    }

    #[test]
    fn endpoints_are_read_at_the_far_node() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        assert_eq!(g.endpoint(0, 1), Some(Endpoint::Arrow));
        assert_eq!(g.endpoint(1, 0), Some(Endpoint::Tail));
        assert!(g.is_parent_of(0, 1));
        assert!(!g.is_parent_of(1, 0));
    }

    #[test]
    fn second_edge_between_same_pair_is_rejected() {
        let mut g = abc();
        g.add_undirected_edge(0, 1).unwrap();
        assert!(matches!(
            g.add_directed_edge(1, 0),
            Err(GraphError::EdgeExists { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Graph::with_nodes(nodes_from_names(&["A", "A"])).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("A".into()));
    }

    #[test]
    fn unshielded_triples_skip_shielded() {
        let mut g = abc();
        g.add_undirected_edge(0, 1).unwrap();
        g.add_undirected_edge(1, 2).unwrap();
        assert_eq!(g.unshielded_triples(), vec![Triple::new(0, 1, 2)]);
        g.add_undirected_edge(0, 2).unwrap();
        assert!(g.unshielded_triples().is_empty());
    }

    #[test]
    fn directed_cycle_is_detected() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        assert!(g.is_dag());
        assert_eq!(g.topological_order().unwrap(), vec![0, 1, 2]);
        g.add_directed_edge(2, 0).unwrap();
        assert!(!g.is_acyclic());
        assert!(g.topological_order().is_err());
    }

    #[test]
    fn display_lists_edges_with_connectors() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        g.add_edge(Edge::partially_oriented(2, 1)).unwrap();
        let text = g.to_string();
        assert!(text.contains("1. A --> B"));
        assert!(text.contains("2. B <-o C"));
    }

    #[test]
    fn snapshot_round_trip_preserves_marks() {
        let mut g = abc();
        g.add_bidirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        let json = serde_json::to_string(&g.snapshot()).unwrap();
        let back: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(Graph::from_snapshot(&back).unwrap(), g);
    }
}
