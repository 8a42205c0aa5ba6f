//! Score-based initial graph for GFCI.

use causa_core::traits::Score;
use causa_core::{Graph, Knowledge, NodeId, SearchResult};

use crate::utils::cpdag_for_dag;

/// Smallest score gain that counts as an improvement.
const MIN_IMPROVEMENT: f64 = 1e-9;

/// Produces the CPDAG GFCI starts from.
pub trait InitialGraphSearch: Send + Sync {
    /// A CPDAG over the score's variables.
    fn search(&self, score: &dyn Score, knowledge: &Knowledge) -> SearchResult<Graph>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Move {
    Add(NodeId, NodeId),
    Remove(NodeId, NodeId),
    /// `x --> y` becomes `y --> x`.
    Reverse(NodeId, NodeId),
}

/// Hill climbing over DAGs with single-edge additions, removals and
/// reversals, taking the best-scoring move each step. Required edges are
/// placed first and never touched; forbidden edges are never added. A move
/// whose gain is NaN is never taken.
#[derive(Debug, Clone)]
pub struct GreedyDagSearch {
    max_parents: Option<usize>,
    max_iterations: usize,
}

impl Default for GreedyDagSearch {
    fn default() -> Self {
        Self {
            max_parents: None,
            max_iterations: 10_000,
        }
    }
}

impl GreedyDagSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_parents(mut self, max_parents: usize) -> Self {
        self.max_parents = Some(max_parents);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The DAG hill climbing ends on.
    pub fn search_dag(&self, score: &dyn Score, knowledge: &Knowledge) -> SearchResult<Graph> {
        let mut dag = Graph::with_nodes(score.variables().to_vec())?;
        for (from, to) in knowledge.required_edges() {
            let (Some(a), Some(b)) = (dag.node_id(from), dag.node_id(to)) else {
                continue;
            };
            if !dag.is_adjacent(a, b) && !dag.exists_directed_path(b, a) {
                dag.add_directed_edge(a, b)?;
            }
        }

        let n = dag.node_count();
        let mut local: Vec<f64> = (0..n).map(|y| score.local_score(y, &dag.parents(y))).collect();
        let mut steps = 0;
        while steps < self.max_iterations {
            let Some((gain, mv)) = self.best_move(&dag, score, knowledge, &local) else {
                break;
            };
            match mv {
                Move::Add(x, y) => dag.add_directed_edge(x, y)?,
                Move::Remove(x, y) => {
                    dag.remove_edge(x, y);
                }
                Move::Reverse(x, y) => dag.orient(y, x)?,
            }
            let (x, y) = match mv {
                Move::Add(x, y) | Move::Remove(x, y) | Move::Reverse(x, y) => (x, y),
            };
            local[x] = score.local_score(x, &dag.parents(x));
            local[y] = score.local_score(y, &dag.parents(y));
            tracing::trace!(?mv, gain, "greedy step");
            steps += 1;
        }
        tracing::debug!(steps, edges = dag.num_edges(), "greedy DAG search finished");
        Ok(dag)
    }

    fn best_move(&self, dag: &Graph, score: &dyn Score, knowledge: &Knowledge, local: &[f64]) -> Option<(f64, Move)> {
        let mut best: Option<(f64, Move)> = None;
        let mut consider = |gain: f64, mv: Move| {
            if gain.is_nan() || gain <= MIN_IMPROVEMENT {
                return;
            }
            if best.map_or(true, |(g, _)| gain > g) {
                best = Some((gain, mv));
            }
        };
        for y in dag.node_ids() {
            let parents = dag.parents(y);
            for x in dag.node_ids() {
                if x == y {
                    continue;
                }
                if dag.is_parent_of(x, y) {
                    if knowledge.requires(dag, x, y) {
                        continue;
                    }
                    let without: Vec<NodeId> = parents.iter().copied().filter(|&p| p != x).collect();
                    let removal = score.local_score(y, &without) - local[y];
                    consider(removal, Move::Remove(x, y));

                    let reversible = !knowledge.forbids(dag, y, x)
                        && self.max_parents.map_or(true, |m| dag.parents(x).len() < m)
                        && !has_other_directed_path(dag, x, y);
                    if reversible {
                        let mut x_parents = dag.parents(x);
                        x_parents.push(y);
                        let gain = removal + score.local_score(x, &x_parents) - local[x];
                        consider(gain, Move::Reverse(x, y));
                    }
                } else if !dag.is_adjacent(x, y) {
                    if knowledge.forbids(dag, x, y)
                        || self.max_parents.is_some_and(|m| parents.len() >= m)
                        || dag.exists_directed_path(y, x)
                    {
                        continue;
                    }
                    consider(score.local_score_diff(x, y, &parents), Move::Add(x, y));
                }
            }
        }
        best
    }
}

/// A directed path `x ~~> y` other than the edge `x --> y` itself.
fn has_other_directed_path(dag: &Graph, x: NodeId, y: NodeId) -> bool {
    dag.children(x)
        .into_iter()
        .filter(|&c| c != y)
        .any(|c| dag.exists_directed_path(c, y))
}

impl InitialGraphSearch for GreedyDagSearch {
    fn search(&self, score: &dyn Score, knowledge: &Knowledge) -> SearchResult<Graph> {
        let dag = self.search_dag(score, knowledge)?;
        cpdag_for_dag(&dag)
    }

    fn name(&self) -> &'static str {
        "greedy-dag"
    }
}
