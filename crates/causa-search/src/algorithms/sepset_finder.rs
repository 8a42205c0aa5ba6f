//! Where orientation rules get their separating sets.

use std::sync::Arc;

use causa_core::config::{depth_limit, validate_depth, SepsetStrategy};
use causa_core::errors::ConfigError;
use causa_core::traits::IndependenceTest;
use causa_core::{Graph, NodeId, SepsetMap};

use crate::fas::subsets::subsets_up_to;

/// Answers "what separates `x` and `y`?" during orientation.
pub trait SepsetProducer: Send + Sync {
    /// A separating set for the pair, or `None` if there is none.
    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>>;
}

/// The sepsets adjacency search recorded.
impl SepsetProducer for SepsetMap {
    fn sepset(&self, _graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        self.get(x, y)
    }
}

/// Searches for a sepset on demand among subsets of the current adjacencies
/// of `x` and of `y`, smallest sets first.
///
/// - `Greedy` returns the first separating set.
/// - `MaxP` returns the separating set with the largest p-value.
/// - `MinP` returns the separating set with the smallest p-value.
pub struct SepsetFinder {
    test: Arc<dyn IndependenceTest>,
    strategy: SepsetStrategy,
    depth: i32,
}

impl SepsetFinder {
    pub fn new(test: Arc<dyn IndependenceTest>, strategy: SepsetStrategy) -> Self {
        Self {
            test,
            strategy,
            depth: causa_core::constants::UNBOUNDED,
        }
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        validate_depth(depth)?;
        self.depth = depth;
        Ok(())
    }

    pub fn strategy(&self) -> SepsetStrategy {
        self.strategy
    }
}

impl SepsetProducer for SepsetFinder {
    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        let limit = depth_limit(self.depth);
        let mut best: Option<(Vec<NodeId>, f64)> = None;
        for (side, other) in [(x, y), (y, x)] {
            let pool: Vec<NodeId> = graph.adjacent_iter(side).filter(|&n| n != other).collect();
            let max = limit.unwrap_or(pool.len());
            for cond in subsets_up_to(&pool, max) {
                let result = self.test.check_independence(x, y, &cond);
                if !result.independent {
                    continue;
                }
                let p = result.p_value;
                let better = match (&best, self.strategy) {
                    (_, SepsetStrategy::Greedy) => return Some(cond),
                    (None, _) => true,
                    (Some((_, bp)), SepsetStrategy::MaxP) => p > *bp,
                    (Some((_, bp)), SepsetStrategy::MinP) => p < *bp,
                };
                if better {
                    best = Some((cond, p));
                }
            }
        }
        best.map(|(cond, _)| cond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;
    use causa_core::traits::{IndependenceResult, LastPValue};
    use causa_core::Node;

    /// X0 and X1 are independent given {X2} (p = 0.3) and given {X3} (p = 0.6).
    struct Scripted {
        nodes: Vec<Node>,
        last: LastPValue,
    }

    impl IndependenceTest for Scripted {
        fn variables(&self) -> &[Node] {
            &self.nodes
        }

        fn check_independence(&self, _x: NodeId, _y: NodeId, z: &[NodeId]) -> IndependenceResult {
            let p = match z {
                [2] => 0.3,
                [3] => 0.6,
                _ => 0.01,
            };
            self.last.store(p);
            IndependenceResult::from_p_value(p, 0.05)
        }

        fn alpha(&self) -> f64 {
            0.05
        }

        fn last_p_value(&self) -> Option<f64> {
            self.last.load()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn setup() -> (Graph, Arc<dyn IndependenceTest>) {
        let nodes = nodes_from_names(&["X0", "X1", "X2", "X3"]);
        let mut g = Graph::with_nodes(nodes.clone()).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(0, 3).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        let test: Arc<dyn IndependenceTest> = Arc::new(Scripted {
            nodes,
            last: LastPValue::new(),
        });
        (g, test)
    }

    #[test]
    fn strategies_pick_different_sets() {
        let (g, test) = setup();
        let greedy = SepsetFinder::new(test.clone(), SepsetStrategy::Greedy);
        assert_eq!(greedy.sepset(&g, 0, 1), Some(vec![2]));
        let max_p = SepsetFinder::new(test.clone(), SepsetStrategy::MaxP);
        assert_eq!(max_p.sepset(&g, 0, 1), Some(vec![3]));
        let min_p = SepsetFinder::new(test, SepsetStrategy::MinP);
        assert_eq!(min_p.sepset(&g, 0, 1), Some(vec![2]));
    }

    #[test]
    fn depth_zero_only_tries_empty_set() {
        let (g, test) = setup();
        let mut finder = SepsetFinder::new(test, SepsetStrategy::MaxP);
        finder.set_depth(0).unwrap();
        assert_eq!(finder.sepset(&g, 0, 1), None);
    }

    #[test]
    fn recorded_map_is_a_producer() {
        let (g, _) = setup();
        let map = SepsetMap::new();
        map.set(1, 0, Some(vec![3]));
        assert_eq!(SepsetProducer::sepset(&map, &g, 0, 1), Some(vec![3]));
    }
}
