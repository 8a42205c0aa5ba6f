//! FCI and GFCI end to end.

use std::sync::Arc;

use causa_core::errors::{ConfigError, SearchError};
use causa_core::graph::{Endpoint, Node, NodeId};
use causa_core::traits::{IndependenceTest, Score};
use causa_core::{Graph, Knowledge, SearchResult};
use causa_search::utils::is_legal_pag;
use causa_search::{Fci, GFci, GraphSearch, InitialGraphSearch};
use causa_stats::{DSeparationTest, FisherZTest, SemBicScore};
use test_fixtures::{chain, dag_from_edges, random_dag, with_latents, LinearSem};

fn oracle(graph: &Graph) -> Arc<dyn IndependenceTest> {
    Arc::new(DSeparationTest::new(graph.clone()))
}

/// A -> B <- L -> C <- D with L unmeasured.
fn confounded() -> Graph {
    let dag = dag_from_edges(
        &["A", "B", "C", "D", "L"],
        &[("A", "B"), ("L", "B"), ("L", "C"), ("D", "C")],
    );
    with_latents(&dag, &["L"])
}

#[test]
fn latent_common_cause_becomes_bidirected() {
    let mut fci = Fci::new(oracle(&confounded()));
    let pag = fci.search().unwrap();
    let (a, b, c, d) = (0, 1, 2, 3);

    assert_eq!(pag.node_count(), 4);
    assert_eq!(pag.num_edges(), 3);
    assert!(pag.is_bidirected(b, c));
    // A o-> B
    assert_eq!(pag.endpoint(a, b), Some(Endpoint::Arrow));
    assert_eq!(pag.endpoint(b, a), Some(Endpoint::Circle));
    // D o-> C
    assert_eq!(pag.endpoint(d, c), Some(Endpoint::Arrow));
    assert_eq!(pag.endpoint(c, d), Some(Endpoint::Circle));
    assert!(is_legal_pag(&pag));
}

#[test]
fn repair_pass_reports_legal_output() {
    let mut fci = Fci::new(oracle(&confounded()));
    assert_eq!(fci.is_legal(), None);
    fci.set_guarantee_pag(true);
    fci.search().unwrap();
    assert_eq!(fci.is_legal(), Some(true));
}

#[test]
fn chain_is_left_with_circles() {
    let pag = Fci::new(oracle(&chain(&["A", "B", "C"]))).search().unwrap();
    assert_eq!(pag.num_edges(), 2);
    for edge in pag.edges() {
        assert_eq!(edge.endpoint1, Endpoint::Circle);
        assert_eq!(edge.endpoint2, Endpoint::Circle);
    }
}

#[test]
fn collider_with_child_orients_the_child_edge() {
    let dag = dag_from_edges(&["A", "B", "C", "D"], &[("A", "C"), ("B", "C"), ("C", "D")]);
    let pag = Fci::new(oracle(&dag)).search().unwrap();
    assert_eq!(pag.endpoint(0, 2), Some(Endpoint::Arrow));
    assert_eq!(pag.endpoint(1, 2), Some(Endpoint::Arrow));
    assert!(pag.is_directed_from_to(2, 3));
}

#[test]
fn rule_set_choice_keeps_the_skeleton() {
    let dag = random_dag(7, 9, 13);
    let mut complete = Fci::new(oracle(&dag));
    complete.set_complete_rule_set(true);
    let mut partial = Fci::new(oracle(&dag));
    partial.set_complete_rule_set(false);
    let a = complete.search().unwrap();
    let b = partial.search().unwrap();
    for x in dag.node_ids() {
        for y in dag.node_ids() {
            assert_eq!(a.is_adjacent(x, y), dag.is_adjacent(x, y));
            assert_eq!(b.is_adjacent(x, y), dag.is_adjacent(x, y));
        }
    }
}

#[test]
fn threads_do_not_change_fci() {
    let dag = with_latents(&random_dag(9, 13, 31), &["X1"]);
    let single = Fci::new(oracle(&dag)).search().unwrap();
    let mut fci = Fci::new(oracle(&dag));
    fci.set_num_threads(3).unwrap();
    assert_eq!(fci.search().unwrap(), single);
}

#[test]
fn possible_dsep_step_is_optional() {
    let mut fci = Fci::new(oracle(&confounded()));
    fci.set_possible_dsep(false);
    let pag = fci.search().unwrap();
    assert!(pag.is_bidirected(1, 2));
    assert!(fci.sepsets().unwrap().contains(0, 2));
}

#[test]
fn required_edge_is_oriented() {
    let mut knowledge = Knowledge::new();
    knowledge.add_required("A", "B").unwrap();
    let mut fci = Fci::new(oracle(&chain(&["A", "B", "C"])));
    fci.set_knowledge(Arc::new(knowledge));
    let pag = fci.search().unwrap();
    assert!(pag.is_directed_from_to(0, 1));
}

#[test]
fn setters_validate() {
    let mut fci = Fci::new(oracle(&chain(&["A", "B"])));
    assert!(matches!(fci.set_depth(-3), Err(ConfigError::InvalidDepth { depth: -3 })));
    assert!(matches!(
        fci.set_max_path_length(-2),
        Err(ConfigError::InvalidPathLength { length: -2 })
    ));
    assert!(matches!(fci.set_num_threads(0), Err(ConfigError::ZeroThreads)));
}

/// Score stand-in for GFCI runs whose initial graph is injected.
struct FlatScore {
    variables: Vec<Node>,
}

impl Score for FlatScore {
    fn variables(&self) -> &[Node] {
        &self.variables
    }

    fn local_score(&self, _node: NodeId, _parents: &[NodeId]) -> f64 {
        0.0
    }

    fn sample_size(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// Hands GFCI a fixed starting graph.
struct FixedInitial(Graph);

impl InitialGraphSearch for FixedInitial {
    fn search(&self, _score: &dyn Score, _knowledge: &Knowledge) -> SearchResult<Graph> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[test]
fn gfci_drops_the_shielding_edge_of_a_collider() {
    let names = ["A", "B", "C", "D"];
    let truth = dag_from_edges(&names, &[("A", "C"), ("B", "C"), ("C", "D")]);
    // The score-based graph shields A -> C <- B with a spurious A -> B.
    let initial = dag_from_edges(&names, &[("A", "B"), ("A", "C"), ("B", "C"), ("C", "D")]);

    let score = Arc::new(FlatScore {
        variables: truth.nodes().to_vec(),
    });
    let mut gfci = GFci::new(oracle(&truth), score).unwrap();
    gfci.set_initial_search(Box::new(FixedInitial(initial)));
    gfci.set_guarantee_pag(true);
    let pag = gfci.search().unwrap();

    assert_eq!(pag.num_edges(), 3);
    assert!(!pag.is_adjacent(0, 1));
    assert_eq!(pag.endpoint(0, 2), Some(Endpoint::Arrow));
    assert_eq!(pag.endpoint(2, 0), Some(Endpoint::Circle));
    assert_eq!(pag.endpoint(1, 2), Some(Endpoint::Arrow));
    assert!(pag.is_directed_from_to(2, 3));
    assert_eq!(gfci.is_legal(), Some(true));
}

#[test]
fn gfci_runs_on_gaussian_data() {
    let dag = chain(&["A", "B", "C"]);
    let data = LinearSem::uniform(&dag, 0.8).simulate(1000, 21);
    let test = Arc::new(FisherZTest::new(&data, 0.01).unwrap());
    let score = Arc::new(SemBicScore::new(&data, 1.0).unwrap());
    let pag = GFci::new(test, score).unwrap().search().unwrap();
    assert_eq!(pag.node_count(), 3);
    assert_eq!(pag.names(), vec!["A", "B", "C"]);
}

#[test]
fn gfci_rejects_mismatched_variables() {
    let dag = chain(&["A", "B", "C"]);
    let data = LinearSem::uniform(&dag, 0.8).simulate(200, 1);
    let fewer = data.subset(&["A", "B"]).unwrap();
    let test = Arc::new(FisherZTest::new(&fewer, 0.05).unwrap());
    let score = Arc::new(SemBicScore::new(&data, 1.0).unwrap());
    assert!(matches!(
        GFci::new(test, score),
        Err(ConfigError::VariableMismatch { .. })
    ));
}

#[test]
fn search_errors_wrap_config_errors() {
    let err: SearchError = ConfigError::ZeroThreads.into();
    assert!(matches!(err, SearchError::Config(ConfigError::ZeroThreads)));
}

#[test]
fn threads_do_not_change_gfci() {
    let truth = random_dag(7, 9, 13);
    let owned = truth.names();
    let names: Vec<&str> = owned.iter().map(String::as_str).collect();
    let n = names.len();
    // Every pair adjacent: each shielded collider of the starting graph is a
    // candidate for removal.
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((names[i], names[j]));
        }
    }
    let complete = dag_from_edges(&names, &pairs);

    let run = |threads: usize| {
        let score = Arc::new(FlatScore {
            variables: truth.nodes().to_vec(),
        });
        let mut gfci = GFci::new(oracle(&truth), score).unwrap();
        gfci.set_initial_search(Box::new(FixedInitial(complete.clone())));
        gfci.set_num_threads(threads).unwrap();
        gfci.search().unwrap()
    };
    let single = run(1);
    for threads in [2, 4] {
        assert_eq!(run(threads), single, "{threads} threads");
    }
}

#[test]
fn gfci_rejects_zero_threads() {
    let dag = chain(&["A", "B"]);
    let score = Arc::new(FlatScore {
        variables: dag.nodes().to_vec(),
    });
    let mut gfci = GFci::new(oracle(&dag), score).unwrap();
    assert!(matches!(gfci.set_num_threads(0), Err(ConfigError::ZeroThreads)));
    gfci.set_num_threads(3).unwrap();
    assert_eq!(gfci.num_threads(), 3);
}
