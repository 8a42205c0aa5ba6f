//! PC, PC-Stable, CPC and CPC-Stable.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use causa_core::config::{validate_depth, validate_threads};
use causa_core::errors::ConfigError;
use causa_core::traits::{IndependenceTest, SearchObserver, TracingObserver};
use causa_core::{Graph, Knowledge, SearchResult, SepsetMap};

use super::GraphSearch;
use crate::fas::{AdjacencySearch, AdjacencySearchResult, Fas, FasConcurrent, FasStable};
use crate::orient::{
    classify_conservatively, orient_by_knowledge, orient_colliders_from_sepsets,
    orient_conservative_colliders, ConflictPolicy, MeekRules, TripleClassification,
};

/// Which adjacency schedule and which collider step to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PcVariant {
    Pc,
    PcStable,
    Cpc,
    CpcStable,
}

impl PcVariant {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::PcStable => "pc-stable",
            Self::Cpc => "cpc",
            Self::CpcStable => "cpc-stable",
        }
    }

    /// Adjacencies are frozen per depth.
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::PcStable | Self::CpcStable)
    }

    /// Colliders come from the conservative rule.
    pub fn is_conservative(&self) -> bool {
        matches!(self, Self::Cpc | Self::CpcStable)
    }
}

/// Adjacency search, collider orientation, then Meek's rules. The result is
/// a CPDAG; CPC variants may leave ambiguous triples unoriented.
pub struct Pc {
    test: Arc<dyn IndependenceTest>,
    variant: PcVariant,
    depth: i32,
    num_threads: usize,
    knowledge: Arc<Knowledge>,
    conflict_policy: ConflictPolicy,
    initial_graph: Option<Graph>,
    observer: Arc<dyn SearchObserver>,
    sepsets: Option<SepsetMap>,
    triples: Option<TripleClassification>,
    tests_performed: usize,
}

impl Pc {
    pub fn new(test: Arc<dyn IndependenceTest>, variant: PcVariant) -> Self {
        Self {
            test,
            variant,
            depth: causa_core::constants::UNBOUNDED,
            num_threads: causa_core::config::defaults::DEFAULT_NUM_THREADS,
            knowledge: Arc::new(Knowledge::new()),
            conflict_policy: ConflictPolicy::default(),
            initial_graph: None,
            observer: Arc::new(TracingObserver),
            sepsets: None,
            triples: None,
            tests_performed: 0,
        }
    }

    pub fn pc(test: Arc<dyn IndependenceTest>) -> Self {
        Self::new(test, PcVariant::Pc)
    }

    pub fn pc_stable(test: Arc<dyn IndependenceTest>) -> Self {
        Self::new(test, PcVariant::PcStable)
    }

    pub fn cpc(test: Arc<dyn IndependenceTest>) -> Self {
        Self::new(test, PcVariant::Cpc)
    }

    pub fn cpc_stable(test: Arc<dyn IndependenceTest>) -> Self {
        Self::new(test, PcVariant::CpcStable)
    }

    pub fn variant(&self) -> PcVariant {
        self.variant
    }

    pub fn set_depth(&mut self, depth: i32) -> Result<(), ConfigError> {
        validate_depth(depth)?;
        self.depth = depth;
        Ok(())
    }

    /// Worker threads for the stable variants' adjacency search. The
    /// order-dependent variants always run on one thread.
    pub fn set_num_threads(&mut self, num_threads: usize) -> Result<(), ConfigError> {
        validate_threads(num_threads)?;
        self.num_threads = num_threads;
        Ok(())
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.knowledge = knowledge;
    }

    pub fn set_conflict_policy(&mut self, policy: ConflictPolicy) {
        self.conflict_policy = policy;
    }

    pub fn set_initial_graph(&mut self, graph: Graph) {
        self.initial_graph = Some(graph);
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.observer = observer;
    }

    /// Triple classification from the last search.
    pub fn triple_classification(&self) -> Option<&TripleClassification> {
        self.triples.as_ref()
    }

    pub fn tests_performed(&self) -> usize {
        self.tests_performed
    }

    fn adjacency_search(&self) -> SearchResult<AdjacencySearchResult> {
        macro_rules! configure {
            ($fas:expr) => {{
                let mut fas = $fas;
                fas.set_depth(self.depth)?;
                fas.set_knowledge(self.knowledge.clone());
                fas.set_observer(self.observer.clone());
                if let Some(g) = &self.initial_graph {
                    fas.set_initial_graph(g.clone());
                }
                fas.search()
            }};
        }
        match (self.variant.is_stable(), self.num_threads) {
            (false, _) => configure!(Fas::new(self.test.clone())),
            (true, 1) => configure!(FasStable::new(self.test.clone())),
            (true, n) => configure!(FasConcurrent::new(self.test.clone(), n)?),
        }
    }
}

impl GraphSearch for Pc {
    fn search(&mut self) -> SearchResult<Graph> {
        let started = Instant::now();
        let _span = causa_core::search_span!(self.variant.key(), self.test.variables().len()).entered();

        let skeleton = self.adjacency_search()?;
        let mut graph = skeleton.graph;
        let observer = self.observer.as_ref();
        orient_by_knowledge(&mut graph, &self.knowledge, observer)?;

        let triples = if self.variant.is_conservative() {
            let triples = classify_conservatively(&graph, self.test.as_ref(), self.depth, observer);
            orient_conservative_colliders(&mut graph, &triples, &self.knowledge, self.conflict_policy, observer)?;
            triples
        } else {
            orient_colliders_from_sepsets(
                &mut graph,
                &skeleton.sepsets,
                &self.knowledge,
                self.conflict_policy,
                observer,
            )?
        };

        let implied = MeekRules::new()
            .with_knowledge(self.knowledge.clone())
            .with_ambiguous(triples.ambiguous.clone())
            .with_observer(self.observer.clone())
            .orient_implied(&mut graph)?;

        tracing::info!(
            algorithm = self.variant.key(),
            edges = graph.num_edges(),
            colliders = triples.colliders.len(),
            ambiguous = triples.ambiguous.len(),
            implied,
            tests = skeleton.tests_performed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        self.tests_performed = skeleton.tests_performed;
        self.sepsets = Some(skeleton.sepsets);
        self.triples = Some(triples);
        Ok(graph)
    }

    fn name(&self) -> &'static str {
        self.variant.key()
    }

    fn sepsets(&self) -> Option<&SepsetMap> {
        self.sepsets.as_ref()
    }
}
