//! Order-independent adjacency search with per-depth frozen adjacencies.

use std::sync::Arc;

use causa_core::errors::ConfigError;
use causa_core::traits::{IndependenceTest, SearchObserver};
use causa_core::{Graph, Knowledge, SearchResult};

use super::{run_frozen, separate_frozen, AdjacencySearch, AdjacencySearchResult, FasSettings};

/// PC-Stable adjacency search. Every test at depth `d` draws its conditioning
/// set from the adjacencies as they stood when depth `d` began, so the
/// skeleton does not depend on variable order.
pub struct FasStable {
    settings: FasSettings,
}

impl FasStable {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self {
            settings: FasSettings::new(test),
        }
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        self.settings.set_depth(depth)
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.settings.knowledge = knowledge;
    }

    pub fn set_initial_graph(&mut self, graph: Graph) {
        self.settings.initial_graph = Some(graph);
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.settings.observer = observer;
    }
}

impl AdjacencySearch for FasStable {
    fn search(&self) -> SearchResult<AdjacencySearchResult> {
        let settings = &self.settings;
        run_frozen(settings, self.variant(), |graph, frozen, depth, sepsets| {
            let mut tests = 0;
            let mut removals = Vec::new();
            for edge in graph.edges() {
                let (x, y) = (edge.node1, edge.node2);
                if let Some(found) = separate_frozen(settings, graph, frozen, x, y, depth, &mut tests) {
                    settings.report_removal(graph, x, y, &found.sepset, found.p_value);
                    sepsets.set(x, y, Some(found.sepset));
                    removals.push((x, y));
                }
            }
            Ok((removals, tests))
        })
    }

    fn variant(&self) -> &'static str {
        "fas-stable"
    }
}
