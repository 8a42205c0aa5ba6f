//! FCI: PAG search that allows latent confounders.

use std::sync::Arc;
use std::time::Instant;

use causa_core::config::{validate_depth, validate_path_length, validate_threads};
use causa_core::config::defaults;
use causa_core::errors::ConfigError;
use causa_core::graph::Endpoint;
use causa_core::traits::{IndependenceTest, SearchObserver, TracingObserver};
use causa_core::{Graph, Knowledge, SearchResult, SepsetMap};

use super::{remove_by_possible_dsep, GraphSearch};
use crate::fas::{AdjacencySearch, AdjacencySearchResult, FasConcurrent, FasStable};
use crate::orient::FciOrient;
use crate::utils::guarantee_pag;

/// Stable adjacency search, R0 over a circle-marked skeleton, an optional
/// Possible-D-Sep pass, then the final FCI rules.
pub struct Fci {
    test: Arc<dyn IndependenceTest>,
    depth: i32,
    max_path_length: i32,
    complete_rule_set: bool,
    discriminating_path_rule: bool,
    possible_dsep: bool,
    guarantee_pag: bool,
    num_threads: usize,
    knowledge: Arc<Knowledge>,
    observer: Arc<dyn SearchObserver>,
    sepsets: Option<SepsetMap>,
    legal: Option<bool>,
}

impl Fci {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self {
            test,
            depth: defaults::DEFAULT_DEPTH,
            max_path_length: defaults::DEFAULT_MAX_PATH_LENGTH,
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
            discriminating_path_rule: defaults::DEFAULT_DISCRIMINATING_PATH_RULE,
            possible_dsep: defaults::DEFAULT_POSSIBLE_DSEP,
            guarantee_pag: defaults::DEFAULT_GUARANTEE_PAG,
            num_threads: defaults::DEFAULT_NUM_THREADS,
            knowledge: Arc::new(Knowledge::new()),
            observer: Arc::new(TracingObserver),
            sepsets: None,
            legal: None,
        }
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

    pub fn set_possible_dsep(&mut self, enabled: bool) {
        self.possible_dsep = enabled;
    }

    pub fn set_guarantee_pag(&mut self, enabled: bool) {
        self.guarantee_pag = enabled;
    }

    pub fn set_num_threads(&mut self, num_threads: usize) -> Result<(), ConfigError> {
        validate_threads(num_threads)?;
        self.num_threads = num_threads;
        Ok(())
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.knowledge = knowledge;
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.observer = observer;
    }

    /// Whether the last result passed the PAG legality check. `None` unless
    /// the repair pass ran.
    pub fn is_legal(&self) -> Option<bool> {
        self.legal
    }

    fn orienter(&self) -> Result<FciOrient, ConfigError> {
        let mut orient = FciOrient::new();
        orient.set_knowledge(self.knowledge.clone());
        orient.set_complete_rule_set(self.complete_rule_set);
        orient.set_discriminating_path_rule(self.discriminating_path_rule);
        orient.set_max_path_length(self.max_path_length)?;
        orient.set_observer(self.observer.clone());
        Ok(orient)
    }

    fn adjacency_search(&self) -> SearchResult<AdjacencySearchResult> {
        if self.num_threads > 1 {
            let mut fas = FasConcurrent::new(self.test.clone(), self.num_threads)?;
            fas.set_depth(self.depth)?;
            fas.set_knowledge(self.knowledge.clone());
            fas.set_observer(self.observer.clone());
            fas.search()
        } else {
            let mut fas = FasStable::new(self.test.clone());
            fas.set_depth(self.depth)?;
            fas.set_knowledge(self.knowledge.clone());
            fas.set_observer(self.observer.clone());
            fas.search()
        }
    }
}

impl GraphSearch for Fci {
    fn search(&mut self) -> SearchResult<Graph> {
        let started = Instant::now();
        let _span = causa_core::search_span!("fci", self.test.variables().len()).entered();
        let orient = self.orienter()?;

        let skeleton = self.adjacency_search()?;
        let mut graph = skeleton.graph;
        let sepsets = skeleton.sepsets;
        graph.reorient_all_with(Endpoint::Circle);
        orient.orient_by_knowledge(&mut graph)?;
        orient.rule_r0(&mut graph, &sepsets)?;

        if self.possible_dsep {
            remove_by_possible_dsep(
                &mut graph,
                self.test.as_ref(),
                &sepsets,
                self.depth,
                self.max_path_length,
                &self.knowledge,
                self.observer.as_ref(),
            );
            graph.reorient_all_with(Endpoint::Circle);
            orient.orient_by_knowledge(&mut graph)?;
            orient.rule_r0(&mut graph, &sepsets)?;
        }

        orient.final_orientation(&mut graph, &sepsets)?;
        self.legal = if self.guarantee_pag {
            Some(guarantee_pag(&mut graph, &orient, &sepsets)?)
        } else {
            None
        };

        tracing::info!(
            algorithm = "fci",
            edges = graph.num_edges(),
            tests = skeleton.tests_performed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        self.sepsets = Some(sepsets);
        Ok(graph)
    }

    fn name(&self) -> &'static str {
        "fci"
    }

    fn sepsets(&self) -> Option<&SepsetMap> {
        self.sepsets.as_ref()
    }
}
