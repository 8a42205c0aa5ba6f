//! GFCI: FCI orientation seeded by a score-based CPDAG.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use causa_core::config::{defaults, validate_depth, validate_path_length, validate_threads, SepsetStrategy};
use causa_core::errors::{ConfigError, SearchError};
use causa_core::graph::Endpoint;
use causa_core::traits::{IndependenceTest, Score, SearchObserver, TracingObserver};
use causa_core::{Graph, Knowledge, NodeId, SearchResult};

use super::{GraphSearch, GreedyDagSearch, InitialGraphSearch, SepsetFinder, SepsetProducer};
use crate::orient::fci::ordered_neighbor_pairs;
use crate::orient::FciOrient;
use crate::utils::guarantee_pag;

/// Starts from the CPDAG of a score-based search, drops adjacencies the test
/// can separate, copies the CPDAG's colliders, and finishes with the FCI
/// rules. Sepsets are searched on demand with the configured strategy.
pub struct GFci {
    test: Arc<dyn IndependenceTest>,
    score: Arc<dyn Score>,
    initial: Box<dyn InitialGraphSearch>,
    depth: i32,
    max_path_length: i32,
    complete_rule_set: bool,
    discriminating_path_rule: bool,
    guarantee_pag: bool,
    sepset_strategy: SepsetStrategy,
    num_threads: usize,
    knowledge: Arc<Knowledge>,
    observer: Arc<dyn SearchObserver>,
    legal: Option<bool>,
}

impl GFci {
    /// Test and score must be over the same variable names in the same order.
    pub fn new(test: Arc<dyn IndependenceTest>, score: Arc<dyn Score>) -> Result<Self, ConfigError> {
        let test_names: Vec<&str> = test.variables().iter().map(|n| n.name()).collect();
        let score_names: Vec<&str> = score.variables().iter().map(|n| n.name()).collect();
        if test_names != score_names {
            return Err(ConfigError::VariableMismatch {
                details: format!("test has {test_names:?}, score has {score_names:?}"),
            });
        }
        Ok(Self {
            test,
            score,
            initial: Box::new(GreedyDagSearch::new()),
            depth: defaults::DEFAULT_DEPTH,
            max_path_length: defaults::DEFAULT_MAX_PATH_LENGTH,
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
            discriminating_path_rule: defaults::DEFAULT_DISCRIMINATING_PATH_RULE,
            guarantee_pag: defaults::DEFAULT_GUARANTEE_PAG,
            sepset_strategy: SepsetStrategy::default(),
            num_threads: defaults::DEFAULT_NUM_THREADS,
            knowledge: Arc::new(Knowledge::new()),
            observer: Arc::new(TracingObserver),
            legal: None,
        })
    }

    /// Replace the score-based search that produces the starting CPDAG.
    pub fn set_initial_search(&mut self, initial: Box<dyn InitialGraphSearch>) {
        self.initial = initial;
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        validate_depth(depth)?;
        self.depth = depth;
        Ok(())
    }

    pub fn set_max_path_length(&mut self, length: i32) -> Result<(), ConfigError> {
        validate_path_length(length)?;
        self.max_path_length = length;
        Ok(())
    }

    pub fn set_complete_rule_set(&mut self, complete: bool) {
        self.complete_rule_set = complete;
    }

    pub fn set_discriminating_path_rule(&mut self, enabled: bool) {
        self.discriminating_path_rule = enabled;
    }

    pub fn set_guarantee_pag(&mut self, enabled: bool) {
        self.guarantee_pag = enabled;
    }

    pub fn set_sepset_strategy(&mut self, strategy: SepsetStrategy) {
        self.sepset_strategy = strategy;
    }

    /// Worker count for the extra-edge removal pass.
    pub fn set_num_threads(&mut self, num_threads: usize) -> Result<(), ConfigError> {
        validate_threads(num_threads)?;
        self.num_threads = num_threads;
        Ok(())
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.knowledge = knowledge;
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.observer = observer;
    }

    pub fn is_legal(&self) -> Option<bool> {
        self.legal
    }

    /// Remove `a *-* c` when the CPDAG shields a collider `a --> b <-- c` and
    /// the test separates `a` and `c`.
    ///
    /// Candidate pairs are tested against the graph as it stood before any
    /// removal, so the outcome does not depend on pair order or thread count.
    fn remove_extra_edges(&self, graph: &mut Graph, cpdag: &Graph, finder: &SepsetFinder) -> SearchResult<usize> {
        let mut candidates: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        for b in graph.node_ids() {
            for (a, c) in ordered_neighbor_pairs(graph, b) {
                if a < c && cpdag.is_adjacent(a, c) && cpdag.is_def_collider(a, b, c) {
                    candidates.insert((a, c));
                }
            }
        }
        let candidates: Vec<(NodeId, NodeId)> = candidates.into_iter().collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| SearchError::ThreadPool(e.to_string()))?;
        let frozen: &Graph = graph;
        let separated: Vec<bool> = pool.install(|| {
            candidates
                .par_iter()
                .map(|&(a, c)| finder.sepset(frozen, a, c).is_some())
                .collect()
        });

        let mut removed = 0;
        for (&(a, c), separated) in candidates.iter().zip(separated) {
            if separated {
                graph.remove_edge(a, c);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// R0 variant: unshielded colliders of the CPDAG are copied, and triples
    /// shielded only in the CPDAG are decided by a fresh sepset search.
    fn copy_colliders(&self, graph: &mut Graph, cpdag: &Graph, finder: &SepsetFinder, orient: &FciOrient) -> SearchResult<usize> {
        let mut oriented = 0;
        for t in graph.unshielded_triples() {
            let (a, b, c) = (t.x, t.y, t.z);
            let collider = if cpdag.is_def_collider(a, b, c) {
                true
            } else if cpdag.is_adjacent(a, c) {
                finder.sepset(graph, a, c).is_some_and(|s| !s.contains(&b))
            } else {
                false
            };
            if collider && orient.orient_collider(graph, a, b, c)? {
                oriented += 1;
            }
        }
        Ok(oriented)
    }
}

impl GraphSearch for GFci {
    fn search(&mut self) -> SearchResult<Graph> {
        let started = Instant::now();
        let _span = causa_core::search_span!("gfci", self.test.variables().len()).entered();

        let mut orient = FciOrient::new();
        orient.set_knowledge(self.knowledge.clone());
        orient.set_complete_rule_set(self.complete_rule_set);
        orient.set_discriminating_path_rule(self.discriminating_path_rule);
        orient.set_max_path_length(self.max_path_length)?;
        orient.set_observer(self.observer.clone());

        let mut finder = SepsetFinder::new(self.test.clone(), self.sepset_strategy);
        finder.set_depth(self.depth)?;

        let cpdag = self
            .initial
            .search(self.score.as_ref(), &self.knowledge)?
            .project_onto(self.test.variables())?;
        tracing::debug!(
            initial = self.initial.name(),
            edges = cpdag.num_edges(),
            "initial CPDAG ready"
        );

        let mut graph = cpdag.clone();
        graph.reorient_all_with(Endpoint::Circle);
        let removed = self.remove_extra_edges(&mut graph, &cpdag, &finder)?;

        graph.reorient_all_with(Endpoint::Circle);
        orient.orient_by_knowledge(&mut graph)?;
        let colliders = self.copy_colliders(&mut graph, &cpdag, &finder, &orient)?;
        orient.final_orientation(&mut graph, &finder)?;

        self.legal = if self.guarantee_pag {
            Some(guarantee_pag(&mut graph, &orient, &finder)?)
        } else {
            None
        };

        tracing::info!(
            algorithm = "gfci",
            edges = graph.num_edges(),
            removed,
            colliders,
            sepset_strategy = self.sepset_strategy.as_str(),
            threads = self.num_threads,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(graph)
    }

    fn name(&self) -> &'static str {
        "gfci"
    }
}
