//! Fast adjacency search: skeleton discovery by conditional independence.
//!
//! Starting from a complete undirected graph (or a supplied initial graph),
//! each depth `d` tests every adjacent pair against conditioning sets of size
//! `d` drawn from the current adjacencies and removes the edge on the first
//! independence found. Three schedules share that contract:
//!
//! - [`Fas`] reads adjacencies live, so a removal earlier in a depth shrinks
//!   later candidate sets. Results depend on variable order.
//! - [`FasStable`] freezes adjacencies at the start of each depth.
//! - [`FasConcurrent`] freezes the same way and fans pair tests out over a
//!   rayon pool. Its output equals [`FasStable`]'s for any thread count.

mod concurrent;
mod sequential;
mod stable;
pub mod subsets;

use std::sync::Arc;

use causa_core::config::{depth_limit, validate_depth};
use causa_core::errors::ConfigError;
use causa_core::traits::{IndependenceTest, SearchEvent, SearchObserver, TracingObserver};
use causa_core::{Endpoint, Graph, Knowledge, NodeId, SearchResult, SepsetMap};

pub use concurrent::FasConcurrent;
pub use sequential::Fas;
pub use stable::FasStable;
pub use subsets::Combinations;

/// Skeleton plus the evidence that justified each removal.
#[derive(Debug, Clone)]
pub struct AdjacencySearchResult {
    /// Undirected graph over the test's variables.
    pub graph: Graph,
    pub sepsets: SepsetMap,
    pub tests_performed: usize,
    /// Largest depth that ran.
    pub depth_reached: usize,
}

/// Common interface of the three adjacency schedules.
pub trait AdjacencySearch {
    fn search(&self) -> SearchResult<AdjacencySearchResult>;

    /// Short label used in spans.
    fn variant(&self) -> &'static str;
}

/// Settings shared by every schedule. Validated when set.
#[derive(Clone)]
pub(crate) struct FasSettings {
    pub test: Arc<dyn IndependenceTest>,
    pub depth: i32,
    pub knowledge: Arc<Knowledge>,
    pub initial_graph: Option<Graph>,
    pub observer: Arc<dyn SearchObserver>,
}

impl FasSettings {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self {
            test,
            depth: causa_core::constants::UNBOUNDED,
            knowledge: Arc::new(Knowledge::new()),
            initial_graph: None,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        validate_depth(depth)?;
        self.depth = depth;
        Ok(())
    }

    pub fn depth_limit(&self) -> Option<usize> {
        depth_limit(self.depth)
    }

    /// The graph the search starts from: the initial graph projected onto the
    /// test's variables with all marks reset to tails, or the complete graph.
    /// Pairs forbidden in both directions start non-adjacent.
    pub fn starting_graph(&self) -> SearchResult<Graph> {
        let variables = self.test.variables().to_vec();
        let mut graph = match &self.initial_graph {
            Some(initial) => {
                let mut g = initial.project_onto(&variables)?;
                g.reorient_all_with(Endpoint::Tail);
                g
            }
            None => Graph::complete_undirected(variables)?,
        };
        if !self.knowledge.is_empty() {
            for edge in graph.edges() {
                let (a, b) = (graph.name(edge.node1), graph.name(edge.node2));
                if self.knowledge.is_forbidden_both_ways(a, b) {
                    graph.remove_edge(edge.node1, edge.node2);
                }
            }
        }
        Ok(graph)
    }

    /// Required adjacencies are never tested.
    pub fn is_protected(&self, graph: &Graph, x: NodeId, y: NodeId) -> bool {
        !self.knowledge.is_empty()
            && self
                .knowledge
                .is_required_either_way(graph.name(x), graph.name(y))
    }

    pub fn report_removal(&self, graph: &Graph, x: NodeId, y: NodeId, sepset: &[NodeId], p_value: f64) {
        if self.observer.enabled() {
            self.observer.on_event(&SearchEvent::EdgeRemoved {
                x: graph.name(x).to_string(),
                y: graph.name(y).to_string(),
                sepset: sepset.iter().map(|&n| graph.name(n).to_string()).collect(),
                p_value,
            });
        }
    }

    pub fn report_depth(&self, depth: usize, edges_remaining: usize) {
        if self.observer.enabled() {
            self.observer.on_event(&SearchEvent::DepthCompleted {
                depth,
                edges_remaining,
            });
        }
    }
}

/// A separating set found for one pair.
#[derive(Debug, Clone)]
pub(crate) struct Separation {
    pub sepset: Vec<NodeId>,
    pub p_value: f64,
}

/// Test `x _||_ y | S` for every size-`depth` subset `S` of `pool`, in
/// lexicographic order, stopping at the first independence.
pub(crate) fn first_separation(
    test: &dyn IndependenceTest,
    x: NodeId,
    y: NodeId,
    pool: &[NodeId],
    depth: usize,
    tests: &mut usize,
) -> Option<Separation> {
    if pool.len() < depth {
        return None;
    }
    for sepset in Combinations::new(pool, depth) {
        *tests += 1;
        let result = test.check_independence(x, y, &sepset);
        if result.independent {
            return Some(Separation {
                sepset,
                p_value: result.p_value,
            });
        }
    }
    None
}

/// Candidate conditioning nodes for testing `x`-`y` from `x`'s side.
pub(crate) fn pool_without(adjacent: &[NodeId], exclude: NodeId) -> Vec<NodeId> {
    adjacent.iter().copied().filter(|&n| n != exclude).collect()
}

/// Largest `|adj(x)| - 1` over all nodes. Depth `d` can only remove edges
/// while some node has more than `d` other neighbors.
pub(crate) fn max_free_degree(graph: &Graph) -> usize {
    graph
        .node_ids()
        .map(|x| graph.degree(x).saturating_sub(1))
        .max()
        .unwrap_or(0)
}

/// Depth loop shared by the frozen schedules. `run_depth` processes one depth
/// over the frozen adjacency lists and returns the removals it decided on.
pub(crate) fn run_frozen<F>(settings: &FasSettings, variant: &'static str, mut run_depth: F) -> SearchResult<AdjacencySearchResult>
where
    F: FnMut(&Graph, &[Vec<NodeId>], usize, &SepsetMap) -> SearchResult<(Vec<(NodeId, NodeId)>, usize)>,
{
    let mut graph = settings.starting_graph()?;
    let sepsets = SepsetMap::new();
    let mut tests_performed = 0;
    let mut depth_reached = 0;
    let limit = settings.depth_limit();

    let mut depth = 0;
    loop {
        if limit.is_some_and(|l| depth > l) {
            break;
        }
        let _span = causa_core::fas_span!(variant, depth).entered();
        let frozen: Vec<Vec<NodeId>> = graph.node_ids().map(|x| graph.adjacent_nodes(x)).collect();
        let (removals, tests) = run_depth(&graph, &frozen, depth, &sepsets)?;
        tests_performed += tests;
        for (x, y) in removals {
            graph.remove_edge(x, y);
        }
        depth_reached = depth;
        settings.report_depth(depth, graph.num_edges());
        if max_free_degree(&graph) <= depth {
            break;
        }
        depth += 1;
    }

    tracing::debug!(
        variant,
        tests_performed,
        depth_reached,
        edges = graph.num_edges(),
        "adjacency search finished"
    );
    Ok(AdjacencySearchResult {
        graph,
        sepsets,
        tests_performed,
        depth_reached,
    })
}

/// Decide one pair against frozen adjacencies: `x`'s side first, then `y`'s.
pub(crate) fn separate_frozen(
    settings: &FasSettings,
    graph: &Graph,
    frozen: &[Vec<NodeId>],
    x: NodeId,
    y: NodeId,
    depth: usize,
    tests: &mut usize,
) -> Option<Separation> {
    if settings.is_protected(graph, x, y) {
        return None;
    }
    let test = settings.test.as_ref();
    first_separation(test, x, y, &pool_without(&frozen[x], y), depth, tests)
        .or_else(|| first_separation(test, x, y, &pool_without(&frozen[y], x), depth, tests))
}
