//! DAG <-> CPDAG conversion.

use std::sync::Arc;

use causa_core::errors::GraphError;
use causa_core::graph::Endpoint;
use causa_core::traits::NoopObserver;
use causa_core::{Graph, SearchResult};

use crate::orient::MeekRules;

/// The CPDAG of `dag`'s Markov equivalence class: the skeleton with the
/// unshielded colliders oriented and Meek's rules applied.
pub fn cpdag_for_dag(dag: &Graph) -> SearchResult<Graph> {
    if !dag.is_dag() {
        return Err(GraphError::NotADag {
            details: "input has non-directed edges or a directed cycle".to_string(),
        }
        .into());
    }
    let mut cpdag = dag.clone();
    cpdag.reorient_all_with(Endpoint::Tail);
    for t in dag.unshielded_colliders() {
        cpdag.set_endpoint(t.x, t.y, Endpoint::Arrow)?;
        cpdag.set_endpoint(t.z, t.y, Endpoint::Arrow)?;
    }
    MeekRules::new()
        .with_observer(Arc::new(NoopObserver))
        .orient_implied(&mut cpdag)?;
    Ok(cpdag)
}

/// Some DAG in the class a CPDAG represents, by repeatedly removing a sink
/// whose undirected neighbors are adjacent to all of its other neighbors
/// and orienting those undirected edges into it.
pub fn dag_from_cpdag(cpdag: &Graph) -> SearchResult<Graph> {
    let mut dag = cpdag.clone();
    let mut remaining = cpdag.clone();
    let mut alive: Vec<bool> = vec![true; cpdag.node_count()];

    for _ in 0..cpdag.node_count() {
        let sink = remaining.node_ids().find(|&x| {
            alive[x] && remaining.children(x).is_empty() && !has_bidirected(&remaining, x) && {
                let neighbors = remaining.adjacent_nodes(x);
                remaining
                    .adjacent_iter(x)
                    .filter(|&y| remaining.is_undirected_from_to(x, y))
                    .all(|y| neighbors.iter().all(|&z| z == y || remaining.is_adjacent(y, z)))
            }
        });
        let Some(x) = sink else {
            return Err(GraphError::NotACpdag {
                details: "no removable sink; orientation would add a collider or cycle".to_string(),
            }
            .into());
        };
        for y in remaining.adjacent_nodes(x) {
            if remaining.is_undirected_from_to(x, y) {
                dag.orient(y, x)?;
            }
            remaining.remove_edge(x, y);
        }
        alive[x] = false;
    }
    if !dag.is_dag() {
        return Err(GraphError::NotACpdag {
            details: "extension is not acyclic".to_string(),
        }
        .into());
    }
    Ok(dag)
}

fn has_bidirected(graph: &Graph, x: usize) -> bool {
    graph.adjacent_iter(x).any(|y| graph.is_bidirected(x, y))
}
