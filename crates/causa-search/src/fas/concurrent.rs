//! Frozen-adjacency search with pair tests spread over a rayon pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use causa_core::config::validate_threads;
use causa_core::errors::{ConfigError, SearchError};
use causa_core::traits::{IndependenceTest, SearchObserver};
use causa_core::{Graph, Knowledge, SearchResult};

use super::{run_frozen, separate_frozen, AdjacencySearch, AdjacencySearchResult, FasSettings};

/// Parallel form of [`super::FasStable`].
///
/// Within a depth every pair is decided from the frozen adjacency lists, so
/// pair decisions are independent of each other and of scheduling. Each pair
/// is owned by one worker, which is the only writer of that pair's sepset.
/// Edge removals are applied after the depth's barrier.
pub struct FasConcurrent {
    settings: FasSettings,
    num_threads: usize,
}

impl FasConcurrent {
    pub fn new(test: Arc<dyn IndependenceTest>, num_threads: usize) -> Result<Self, ConfigError> {
        validate_threads(num_threads)?;
        Ok(Self {
            settings: FasSettings::new(test),
            num_threads,
        })
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        self.settings.set_depth(depth)
    }

    pub fn set_num_threads(&mut self, num_threads: usize) -> Result<(), ConfigError> {
        validate_threads(num_threads)?;
        self.num_threads = num_threads;
        Ok(())
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
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

impl AdjacencySearch for FasConcurrent {
    fn search(&self) -> SearchResult<AdjacencySearchResult> {
        let settings = &self.settings;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| SearchError::ThreadPool(e.to_string()))?;

        run_frozen(settings, self.variant(), |graph, frozen, depth, sepsets| {
            let tests = AtomicUsize::new(0);
            let edges = graph.edges();
            let decisions: Vec<bool> = pool.install(|| {
                edges
                    .par_iter()
                    .map(|edge| {
                        let (x, y) = (edge.node1, edge.node2);
                        let mut local = 0;
                        let found = separate_frozen(settings, graph, frozen, x, y, depth, &mut local);
                        tests.fetch_add(local, Ordering::Relaxed);
                        match found {
                            Some(found) => {
                                settings.report_removal(graph, x, y, &found.sepset, found.p_value);
                                sepsets.set(x, y, Some(found.sepset));
                                true
                            }
                            None => false,
                        }
                    })
                    .collect()
            });
            let removals = edges
                .iter()
                .zip(decisions)
                .filter(|(_, removed)| *removed)
                .map(|(edge, _)| (edge.node1, edge.node2))
                .collect();
            Ok((removals, tests.into_inner()))
        })
    }

    fn variant(&self) -> &'static str {
        "fas-concurrent"
    }
}
