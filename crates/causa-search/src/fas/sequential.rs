//! Order-dependent adjacency search over live adjacencies.

use std::sync::Arc;

use causa_core::errors::ConfigError;
use causa_core::traits::{IndependenceTest, SearchObserver};
use causa_core::{Graph, Knowledge, SearchResult, SepsetMap};

use super::{
    first_separation, max_free_degree, pool_without, AdjacencySearch, AdjacencySearchResult,
    FasSettings,
};

/// Classic PC adjacency search. Candidate sets are read from the graph as it
/// is being pruned, so a removal earlier in a depth affects later tests.
pub struct Fas {
    settings: FasSettings,
}

impl Fas {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self {
            settings: FasSettings::new(test),
        }
    }

    /// Maximum conditioning-set size; -1 for unbounded.
    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        self.settings.set_depth(depth)
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.settings.knowledge = knowledge;
    }

    /// Restrict the search to the adjacencies of `graph`.
    pub fn set_initial_graph(&mut self, graph: Graph) {
        self.settings.initial_graph = Some(graph);
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.settings.observer = observer;
    }
}

impl AdjacencySearch for Fas {
    fn search(&self) -> SearchResult<AdjacencySearchResult> {
        let settings = &self.settings;
        let test = settings.test.as_ref();
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
            let _span = causa_core::fas_span!(self.variant(), depth).entered();
            for x in graph.node_ids() {
                for y in graph.adjacent_nodes(x) {
                    // Removed earlier in this sweep from the other side.
                    if !graph.is_adjacent(x, y) || settings.is_protected(&graph, x, y) {
                        continue;
                    }
                    let pool = pool_without(&graph.adjacent_nodes(x), y);
                    if let Some(found) =
                        first_separation(test, x, y, &pool, depth, &mut tests_performed)
                    {
                        graph.remove_edge(x, y);
                        settings.report_removal(&graph, x, y, &found.sepset, found.p_value);
                        sepsets.set(x, y, Some(found.sepset));
                    }
                }
            }
            depth_reached = depth;
            settings.report_depth(depth, graph.num_edges());
            if max_free_degree(&graph) <= depth {
                break;
            }
            depth += 1;
        }

        tracing::debug!(
            variant = self.variant(),
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

    fn variant(&self) -> &'static str {
        "fas"
    }
}
