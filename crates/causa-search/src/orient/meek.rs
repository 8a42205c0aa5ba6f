//! Meek's orientation rules R1-R4, applied to a fixed point.

use std::collections::BTreeSet;
use std::sync::Arc;

use causa_core::constants::MAX_ORIENTATION_SWEEPS;
use causa_core::graph::Triple;
use causa_core::traits::{SearchObserver, TracingObserver};
use causa_core::{Graph, Knowledge, NodeId, SearchResult};

use super::report_rule;

/// Propagates orientations implied by the colliders already in a CPDAG.
///
/// An orientation is applied only if knowledge allows it and it does not
/// close a directed cycle, so the directed part stays acyclic whenever it
/// starts acyclic. Triples registered as ambiguous are not treated as
/// noncolliders by R1.
pub struct MeekRules {
    knowledge: Arc<Knowledge>,
    ambiguous: BTreeSet<Triple>,
    observer: Arc<dyn SearchObserver>,
}

impl Default for MeekRules {
    fn default() -> Self {
        Self {
            knowledge: Arc::new(Knowledge::new()),
            ambiguous: BTreeSet::new(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl MeekRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_knowledge(mut self, knowledge: Arc<Knowledge>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_ambiguous(mut self, ambiguous: BTreeSet<Triple>) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Apply R1-R4 until nothing changes. Returns the number of edges oriented.
    pub fn orient_implied(&self, graph: &mut Graph) -> SearchResult<usize> {
        let _span = causa_core::orient_span!("meek").entered();
        let mut oriented = 0;
        for _ in 0..MAX_ORIENTATION_SWEEPS {
            let mut changed = false;
            for edge in graph.edges() {
                let (u, v) = (edge.node1, edge.node2);
                for (a, b) in [(u, v), (v, u)] {
                    if !graph.is_undirected_from_to(a, b) {
                        break;
                    }
                    let Some(rule) = self.forced(graph, a, b) else {
                        continue;
                    };
                    if !self.allowed(graph, a, b) {
                        continue;
                    }
                    graph.orient(a, b)?;
                    report_rule(self.observer.as_ref(), graph, rule, a, b);
                    oriented += 1;
                    changed = true;
                    break;
                }
            }
            if !changed {
                return Ok(oriented);
            }
        }
        tracing::warn!(oriented, "meek rules stopped before reaching a fixed point");
        Ok(oriented)
    }

    fn allowed(&self, graph: &Graph, a: NodeId, b: NodeId) -> bool {
        !self.knowledge.forbids(graph, a, b)
            && !self.knowledge.requires(graph, b, a)
            && !graph.exists_directed_path(b, a)
    }

    /// The first rule forcing `a --> b` on the undirected edge `a --- b`.
    fn forced(&self, graph: &Graph, a: NodeId, b: NodeId) -> Option<&'static str> {
        if self.r1(graph, a, b) {
            Some("R1")
        } else if r2(graph, a, b) {
            Some("R2")
        } else if r3(graph, a, b) {
            Some("R3")
        } else if r4(graph, a, b) {
            Some("R4")
        } else {
            None
        }
    }

    /// `i --> a --- b`, `i` and `b` non-adjacent.
    fn r1(&self, graph: &Graph, a: NodeId, b: NodeId) -> bool {
        graph.parents(a).into_iter().any(|i| {
            i != b && !graph.is_adjacent(i, b) && !self.ambiguous.contains(&Triple::new(i, a, b))
        })
    }
}

/// `a --> k --> b` with `a --- b`.
fn r2(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph
        .children(a)
        .into_iter()
        .any(|k| graph.is_directed_from_to(k, b))
}

/// `a --- k --> b` and `a --- l --> b` with `k`, `l` non-adjacent.
fn r3(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    let ks: Vec<NodeId> = graph
        .adjacent_iter(a)
        .filter(|&k| k != b && graph.is_undirected_from_to(a, k) && graph.is_directed_from_to(k, b))
        .collect();
    ks.iter()
        .enumerate()
        .any(|(i, &k)| ks[i + 1..].iter().any(|&l| !graph.is_adjacent(k, l)))
}

/// `a --- k --> l --> b` with `k`, `b` non-adjacent and `a`, `l` adjacent.
fn r4(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph
        .adjacent_iter(a)
        .filter(|&k| k != b && graph.is_undirected_from_to(a, k) && !graph.is_adjacent(k, b))
        .any(|k| {
            graph
                .children(k)
                .into_iter()
                .any(|l| l != a && graph.is_directed_from_to(l, b) && graph.is_adjacent(a, l))
        })
}
