use std::sync::Arc;

use causa_core::traits::{IndependenceTest, NoopObserver};
use causa_core::Graph;
use causa_search::utils::{cpdag_for_dag, dag_from_cpdag};
use causa_search::{AdjacencySearch, Fci, FasConcurrent, FasStable, GraphSearch, MeekRules, Pc};
use causa_stats::DSeparationTest;
use proptest::prelude::*;
use test_fixtures::random_dag;

fn oracle(dag: &Graph) -> Arc<dyn IndependenceTest> {
    Arc::new(DSeparationTest::new(dag.clone()))
}

fn dag_params() -> impl Strategy<Value = (usize, usize, u64)> {
    (3usize..9).prop_flat_map(|n| (Just(n), 0..=(n * (n - 1) / 2).min(14), any::<u64>()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn meek_orientations_agree_with_the_dag((n, e, seed) in dag_params()) {
        let dag = random_dag(n, e, seed);
        let cpdag = cpdag_for_dag(&dag).unwrap();
        prop_assert!(cpdag.is_acyclic());
        for edge in cpdag.edges() {
            if let Some((from, to)) = edge.direction() {
                prop_assert!(dag.is_directed_from_to(from, to));
            }
        }
    }

    #[test]
    fn meek_is_idempotent((n, e, seed) in dag_params()) {
        let cpdag = cpdag_for_dag(&random_dag(n, e, seed)).unwrap();
        let mut again = cpdag.clone();
        let changed = MeekRules::new()
            .with_observer(Arc::new(NoopObserver))
            .orient_implied(&mut again)
            .unwrap();
        prop_assert_eq!(changed, 0);
        prop_assert_eq!(again, cpdag);
    }

    #[test]
    fn cpdag_extension_round_trips((n, e, seed) in dag_params()) {
        let cpdag = cpdag_for_dag(&random_dag(n, e, seed)).unwrap();
        let member = dag_from_cpdag(&cpdag).unwrap();
        prop_assert!(member.is_dag());
        prop_assert_eq!(cpdag_for_dag(&member).unwrap(), cpdag);
    }

    #[test]
    fn oracle_adjacency_search_recovers_the_skeleton((n, e, seed) in dag_params(), threads in 1usize..4) {
        let dag = random_dag(n, e, seed);
        let stable = FasStable::new(oracle(&dag)).search().unwrap();
        let concurrent = FasConcurrent::new(oracle(&dag), threads).unwrap().search().unwrap();
        for x in dag.node_ids() {
            for y in dag.node_ids() {
                prop_assert_eq!(stable.graph.is_adjacent(x, y), dag.is_adjacent(x, y));
            }
        }
        prop_assert_eq!(concurrent.graph, stable.graph);
        prop_assert_eq!(concurrent.sepsets, stable.sepsets);
    }

    #[test]
    fn fci_keeps_every_unshielded_collider((n, e, seed) in dag_params()) {
        let dag = random_dag(n, e, seed);
        let pag = Fci::new(oracle(&dag)).search().unwrap();
        for t in dag.unshielded_colliders() {
            prop_assert!(pag.is_def_collider(t.x, t.y, t.z));
        }
        prop_assert_eq!(pag.num_edges(), dag.num_edges());
    }

    #[test]
    fn pc_stable_is_deterministic((n, e, seed) in dag_params(), threads in 1usize..4) {
        let dag = random_dag(n, e, seed);
        let mut first = Pc::pc_stable(oracle(&dag));
        let mut second = Pc::pc_stable(oracle(&dag));
        second.set_num_threads(threads).unwrap();
        prop_assert_eq!(first.search().unwrap(), second.search().unwrap());
        prop_assert_eq!(first.sepsets().unwrap(), second.sepsets().unwrap());
        prop_assert_eq!(first.tests_performed(), second.tests_performed());
    }

    #[test]
    fn colliders_agree_with_sepsets((n, e, seed) in dag_params()) {
        let dag = random_dag(n, e, seed);
        for mut pc in [Pc::pc(oracle(&dag)), Pc::pc_stable(oracle(&dag))] {
            let graph = pc.search().unwrap();
            let sepsets = pc.sepsets().unwrap();
            for t in graph.unshielded_triples() {
                let collider = graph.is_def_collider(t.x, t.y, t.z);
                prop_assert_eq!(sepsets.is_in_sepset(t.y, t.x, t.z), Some(!collider));
            }
        }
    }

    #[test]
    fn cpc_triple_kinds_agree_with_sepsets((n, e, seed) in dag_params()) {
        let dag = random_dag(n, e, seed);
        let mut cpc = Pc::cpc_stable(oracle(&dag));
        let graph = cpc.search().unwrap();
        let sepsets = cpc.sepsets().unwrap();
        let triples = cpc.triple_classification().unwrap();
        for t in &triples.colliders {
            prop_assert!(graph.is_def_collider(t.x, t.y, t.z));
            prop_assert_eq!(sepsets.is_in_sepset(t.y, t.x, t.z), Some(false));
        }
        for t in &triples.noncolliders {
            prop_assert!(!graph.is_def_collider(t.x, t.y, t.z));
            prop_assert_eq!(sepsets.is_in_sepset(t.y, t.x, t.z), Some(true));
        }
    }
}
