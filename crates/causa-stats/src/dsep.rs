//! d-separation oracle: answers independence questions from a known graph.
//!
//! Used to check that a search recovers the right structure when every
//! independence answer is exact. Latent nodes of the graph are hidden from
//! `variables()`, so the oracle also drives latent-variable searches.

use causa_core::graph::paths::is_d_separated;
use causa_core::graph::{Graph, Node, NodeId};
use causa_core::traits::{IndependenceResult, IndependenceTest, LastPValue};

pub struct DSeparationTest {
    graph: Graph,
    observed: Vec<Node>,
    /// Variable id -> graph node id.
    to_graph: Vec<NodeId>,
    last_p: LastPValue,
}

impl DSeparationTest {
    /// Oracle over every non-latent node of `graph`, in graph order.
    pub fn new(graph: Graph) -> Self {
        let to_graph: Vec<NodeId> = graph
            .node_ids()
            .filter(|&id| !graph.node(id).is_latent())
            .collect();
        let observed = to_graph.iter().map(|&id| graph.node(id).clone()).collect();
        Self {
            graph,
            observed,
            to_graph,
            last_p: LastPValue::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl IndependenceTest for DSeparationTest {
    fn variables(&self) -> &[Node] {
        &self.observed
    }

    fn check_independence(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> IndependenceResult {
        let z: Vec<NodeId> = z.iter().map(|&v| self.to_graph[v]).collect();
        let separated = is_d_separated(&self.graph, self.to_graph[x], self.to_graph[y], &z);
        let p = if separated { 1.0 } else { 0.0 };
        self.last_p.store(p);
        IndependenceResult::new(separated, p)
    }

    fn alpha(&self) -> f64 {
        0.5
    }

    fn last_p_value(&self) -> Option<f64> {
        self.last_p.load()
    }

    fn name(&self) -> &str {
        "d-separation"
    }
}
