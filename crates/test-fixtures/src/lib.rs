//! Seeded ground-truth fixtures for causa tests and benches.
//!
//! Random DAGs and linear-Gaussian samples drawn from them. Every generator
//! takes an explicit seed so failures reproduce.

use causa_core::graph::{nodes_from_names, Graph, Node, NodeId};
use causa_stats::DataSet;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, Uniform};

/// Variable names `X1..Xn`.
pub fn variable_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("X{i}")).collect()
}

/// DAG over `names` with the given `(from, to)` edges.
///
/// # Panics
/// Panics on unknown names or duplicate edges.
pub fn dag_from_edges(names: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::with_nodes(nodes_from_names(names)).expect("unique names");
    for (from, to) in edges {
        let a = graph.node_id(from).unwrap_or_else(|| panic!("unknown node {from}"));
        let b = graph.node_id(to).unwrap_or_else(|| panic!("unknown node {to}"));
        graph.add_directed_edge(a, b).expect("edge");
    }
    graph
}

/// Directed chain through `names` in order.
pub fn chain(names: &[&str]) -> Graph {
    let edges: Vec<(&str, &str)> = names.windows(2).map(|w| (w[0], w[1])).collect();
    dag_from_edges(names, &edges)
}

/// Random DAG with `num_nodes` nodes and up to `num_edges` edges, oriented
/// along a random causal order.
pub fn random_dag(num_nodes: usize, num_edges: usize, seed: u64) -> Graph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let names = variable_names(num_nodes);
    let mut graph = Graph::with_nodes(nodes_from_names(&names)).expect("unique names");

    let mut order: Vec<NodeId> = graph.node_ids().collect();
    order.shuffle(&mut rng);

    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for i in 0..num_nodes {
        for j in (i + 1)..num_nodes {
            pairs.push((order[i], order[j]));
        }
    }
    pairs.shuffle(&mut rng);
    for &(from, to) in pairs.iter().take(num_edges) {
        graph.add_directed_edge(from, to).expect("fresh pair");
    }
    graph
}

/// Mark the named nodes of `dag` as latent.
pub fn with_latents(dag: &Graph, latent: &[&str]) -> Graph {
    let nodes: Vec<Node> = dag
        .nodes()
        .iter()
        .map(|n| {
            if latent.contains(&n.name()) {
                Node::latent(n.name())
            } else {
                n.clone()
            }
        })
        .collect();
    dag.project_onto(&nodes).expect("same names")
}

/// Linear structural equation model over a DAG.
#[derive(Debug, Clone)]
pub struct LinearSem {
    pub graph: Graph,
    /// `coefficients[child]` holds `(parent, weight)` pairs.
    pub coefficients: Vec<Vec<(NodeId, f64)>>,
    pub noise_sd: f64,
}

impl LinearSem {
    /// Edge weights drawn uniformly from +/-[0.5, 1.5].
    pub fn random(dag: &Graph, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let magnitude = Uniform::new(0.5, 1.5);
        let coefficients = dag
            .node_ids()
            .map(|child| {
                dag.parents(child)
                    .into_iter()
                    .map(|p| {
                        let w: f64 = magnitude.sample(&mut rng);
                        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                        (p, sign * w)
                    })
                    .collect()
            })
            .collect();
        Self {
            graph: dag.clone(),
            coefficients,
            noise_sd: 1.0,
        }
    }

    /// Fixed weight on every edge.
    pub fn uniform(dag: &Graph, weight: f64) -> Self {
        let coefficients = dag
            .node_ids()
            .map(|child| dag.parents(child).into_iter().map(|p| (p, weight)).collect())
            .collect();
        Self {
            graph: dag.clone(),
            coefficients,
            noise_sd: 1.0,
        }
    }

    /// Draw `sample_size` rows. Latent nodes are simulated but dropped from
    /// the returned dataset.
    ///
    /// # Panics
    /// Panics if the graph is not a DAG.
    pub fn simulate(&self, sample_size: usize, seed: u64) -> DataSet {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let noise = Normal::new(0.0, self.noise_sd).expect("positive sd");
        let order = self.graph.topological_order().expect("DAG");
        let n = self.graph.node_count();
        let mut columns = vec![vec![0.0; sample_size]; n];
        for row in 0..sample_size {
            for &node in &order {
                let mut value = noise.sample(&mut rng);
                for &(parent, weight) in &self.coefficients[node] {
                    value += weight * columns[parent][row];
                }
                columns[node][row] = value;
            }
        }
        let (variables, columns): (Vec<Node>, Vec<Vec<f64>>) = self
            .graph
            .nodes()
            .iter()
            .cloned()
            .zip(columns)
            .filter(|(node, _)| !node.is_latent())
            .unzip();
        DataSet::from_columns(variables, columns).expect("well-formed simulation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_dag_is_acyclic_and_reproducible() {
        let a = random_dag(10, 15, 7);
        let b = random_dag(10, 15, 7);
        assert!(a.is_dag());
        assert_eq!(a.num_edges(), 15);
        assert_eq!(a, b);
    }

    #[test]
    fn simulation_drops_latents() {
        let dag = with_latents(&dag_from_edges(&["L", "A", "B"], &[("L", "A"), ("L", "B")]), &["L"]);
        let data = LinearSem::uniform(&dag, 1.0).simulate(50, 1);
        assert_eq!(data.num_variables(), 2);
        assert_eq!(data.sample_size(), 50);
    }
}
