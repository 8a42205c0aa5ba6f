//! Algorithm registry: config keys to configured searches.

use std::sync::Arc;

use causa_core::errors::ConfigError;
use causa_core::traits::{IndependenceTest, Score, SearchObserver, TracingObserver};
use causa_core::{Knowledge, SearchConfig, SearchResult};
use causa_stats::{DataSet, FisherZTest, SemBicScore};

use crate::algorithms::{Fci, GFci, GraphSearch, Pc, PcVariant};

/// Everything a search needs besides its parameters.
#[derive(Clone)]
pub struct SearchInputs {
    pub test: Arc<dyn IndependenceTest>,
    pub score: Option<Arc<dyn Score>>,
    pub knowledge: Arc<Knowledge>,
    pub observer: Arc<dyn SearchObserver>,
}

impl SearchInputs {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self {
            test,
            score: None,
            knowledge: Arc::new(Knowledge::new()),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_score(mut self, score: Arc<dyn Score>) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_knowledge(mut self, knowledge: Arc<Knowledge>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }
}

/// A registered algorithm.
pub struct AlgorithmEntry {
    pub key: &'static str,
    pub description: &'static str,
    pub requires_score: bool,
    pub build_fn: fn(&SearchConfig, &SearchInputs) -> SearchResult<Box<dyn GraphSearch>>,
}

/// All registered algorithms.
pub fn all_algorithms() -> Vec<AlgorithmEntry> {
    vec![
        AlgorithmEntry {
            key: "pc",
            description: "PC with order-dependent adjacency search",
            requires_score: false,
            build_fn: build_pc,
        },
        AlgorithmEntry {
            key: "pc-stable",
            description: "PC with per-depth frozen adjacencies",
            requires_score: false,
            build_fn: build_pc_stable,
        },
        AlgorithmEntry {
            key: "cpc",
            description: "conservative PC",
            requires_score: false,
            build_fn: build_cpc,
        },
        AlgorithmEntry {
            key: "cpc-stable",
            description: "conservative PC with frozen adjacencies",
            requires_score: false,
            build_fn: build_cpc_stable,
        },
        AlgorithmEntry {
            key: "fci",
            description: "FCI for latent confounding",
            requires_score: false,
            build_fn: build_fci,
        },
        AlgorithmEntry {
            key: "gfci",
            description: "FCI seeded by a score-based CPDAG",
            requires_score: true,
            build_fn: build_gfci,
        },
    ]
}

pub fn lookup(key: &str) -> Result<AlgorithmEntry, ConfigError> {
    all_algorithms()
        .into_iter()
        .find(|e| e.key == key)
        .ok_or_else(|| ConfigError::UnknownAlgorithm(key.to_string()))
}

/// Validate `config` and build the algorithm it names.
pub fn build_search(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    config.validate()?;
    let entry = lookup(&config.algorithm)?;
    if entry.requires_score && inputs.score.is_none() {
        return Err(ConfigError::MissingScore {
            algorithm: entry.key.to_string(),
        }
        .into());
    }
    (entry.build_fn)(config, inputs)
}

/// Build the named algorithm over a data set with a Fisher Z test and, when
/// needed, a SEM BIC score.
pub fn build_search_for_data(config: &SearchConfig, data: &DataSet) -> SearchResult<Box<dyn GraphSearch>> {
    config.validate()?;
    let entry = lookup(&config.algorithm)?;
    let mut inputs = SearchInputs::new(Arc::new(FisherZTest::new(data, config.alpha)?));
    if entry.requires_score {
        inputs = inputs.with_score(Arc::new(SemBicScore::new(data, config.penalty_discount)?));
    }
    build_search(config, &inputs)
}

fn build_pc_variant(config: &SearchConfig, inputs: &SearchInputs, variant: PcVariant) -> SearchResult<Box<dyn GraphSearch>> {
    let mut pc = Pc::new(inputs.test.clone(), variant);
    pc.set_depth(config.depth)?;
    pc.set_num_threads(config.num_threads)?;
    pc.set_knowledge(inputs.knowledge.clone());
    pc.set_observer(inputs.observer.clone());
    Ok(Box::new(pc))
}

fn build_pc(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    build_pc_variant(config, inputs, PcVariant::Pc)
}

fn build_pc_stable(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    build_pc_variant(config, inputs, PcVariant::PcStable)
}

fn build_cpc(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    build_pc_variant(config, inputs, PcVariant::Cpc)
}

fn build_cpc_stable(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    build_pc_variant(config, inputs, PcVariant::CpcStable)
}

fn build_fci(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    let mut fci = Fci::new(inputs.test.clone());
    fci.set_depth(config.depth)?;
    fci.set_max_path_length(config.max_path_length)?;
    fci.set_complete_rule_set(config.complete_rule_set);
    fci.set_discriminating_path_rule(config.discriminating_path_rule);
    fci.set_possible_dsep(config.possible_dsep);
    fci.set_guarantee_pag(config.guarantee_pag);
    fci.set_num_threads(config.num_threads)?;
    fci.set_knowledge(inputs.knowledge.clone());
    fci.set_observer(inputs.observer.clone());
    Ok(Box::new(fci))
}

fn build_gfci(config: &SearchConfig, inputs: &SearchInputs) -> SearchResult<Box<dyn GraphSearch>> {
    let score = inputs.score.clone().ok_or_else(|| ConfigError::MissingScore {
        algorithm: "gfci".to_string(),
    })?;
    let mut gfci = GFci::new(inputs.test.clone(), score)?;
    gfci.set_depth(config.depth)?;
    gfci.set_max_path_length(config.max_path_length)?;
    gfci.set_complete_rule_set(config.complete_rule_set);
    gfci.set_discriminating_path_rule(config.discriminating_path_rule);
    gfci.set_guarantee_pag(config.guarantee_pag);
    gfci.set_sepset_strategy(config.sepset_strategy);
    gfci.set_num_threads(config.num_threads)?;
    gfci.set_knowledge(inputs.knowledge.clone());
    gfci.set_observer(inputs.observer.clone());
    Ok(Box::new(gfci))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = all_algorithms().iter().map(|e| e.key).collect();
        let n = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), n);
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        assert!(matches!(lookup("ges"), Err(ConfigError::UnknownAlgorithm(k)) if k == "ges"));
    }

    #[test]
    fn only_gfci_needs_a_score() {
        let scored: Vec<_> = all_algorithms()
            .into_iter()
            .filter(|e| e.requires_score)
            .map(|e| e.key)
            .collect();
        assert_eq!(scored, vec!["gfci"]);
    }
}
