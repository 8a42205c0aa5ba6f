//! FCI's second adjacency pass over Possible-D-Sep sets.
//!
//! After R0 some non-adjacent-in-truth pairs can still be adjacent because
//! their separating set contains nodes that are not adjacent to either end.
//! Possible-D-Sep(x) collects every node reachable from `x` along a path on
//! which each interior node is a collider or sits in a triangle.

use std::collections::{BTreeSet, HashSet};

use causa_core::config::depth_limit;
use causa_core::traits::{IndependenceTest, SearchEvent, SearchObserver};
use causa_core::{Graph, Knowledge, NodeId, SepsetMap};

use crate::fas::subsets::Combinations;

/// Possible-D-Sep of `x` with respect to `y`, excluding both. `limit` bounds
/// the length, in edges, of the paths followed.
pub fn possible_dsep(graph: &Graph, x: NodeId, y: NodeId, limit: Option<usize>) -> BTreeSet<NodeId> {
    let mut found = BTreeSet::new();
    let mut visited: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut stack: Vec<(NodeId, NodeId, usize)> = Vec::new();
    for b in graph.adjacent_iter(x) {
        found.insert(b);
        visited.insert((x, b));
        stack.push((x, b, 1));
    }
    while let Some((a, b, len)) = stack.pop() {
        if limit.is_some_and(|l| len >= l) {
            continue;
        }
        for c in graph.adjacent_iter(b) {
            if c == a || c == x {
                continue;
            }
            if !(graph.is_def_collider(a, b, c) || graph.is_adjacent(a, c)) {
                continue;
            }
            found.insert(c);
            if visited.insert((b, c)) {
                stack.push((b, c, len + 1));
            }
        }
    }
    found.remove(&x);
    found.remove(&y);
    found
}

/// Test every remaining adjacency against subsets of each endpoint's
/// Possible-D-Sep, removing the edge and recording the sepset on the first
/// independence. Subsets run from size 1 up to `depth` (-1 unbounded).
/// Returns the number of edges removed.
pub fn remove_by_possible_dsep(
    graph: &mut Graph,
    test: &dyn IndependenceTest,
    sepsets: &SepsetMap,
    depth: i32,
    max_path_length: i32,
    knowledge: &Knowledge,
    observer: &dyn SearchObserver,
) -> usize {
    let _span = causa_core::fas_span!("possible-dsep", depth).entered();
    let depth_cap = depth_limit(depth);
    let path_cap = depth_limit(max_path_length);
    let mut removed = 0;
    for edge in graph.edges() {
        let (x, y) = (edge.node1, edge.node2);
        if !knowledge.is_empty() && knowledge.is_required_either_way(graph.name(x), graph.name(y)) {
            continue;
        }
        let separated = [(x, y), (y, x)].into_iter().find_map(|(from, other)| {
            let pool: Vec<NodeId> = possible_dsep(graph, from, other, path_cap).into_iter().collect();
            let max = depth_cap.map_or(pool.len(), |d| d.min(pool.len()));
            (1..=max).find_map(|size| {
                Combinations::new(&pool, size).find_map(|cond| {
                    let result = test.check_independence(x, y, &cond);
                    result.independent.then_some((cond, result.p_value))
                })
            })
        });
        if let Some((cond, p_value)) = separated {
            graph.remove_edge(x, y);
            if observer.enabled() {
                observer.on_event(&SearchEvent::EdgeRemoved {
                    x: graph.name(x).to_string(),
                    y: graph.name(y).to_string(),
                    sepset: cond.iter().map(|&n| graph.name(n).to_string()).collect(),
                    p_value,
                });
            }
            sepsets.set(x, y, Some(cond));
            removed += 1;
        }
    }
    tracing::debug!(removed, "possible-dsep pass finished");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::{nodes_from_names, Endpoint};

    #[test]
    fn collider_paths_extend_possible_dsep() {
        // X *-> A <-* B *-> C, X - Y
        let mut g = Graph::with_nodes(nodes_from_names(&["X", "Y", "A", "B", "C"])).unwrap();
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(3, 2).unwrap();
        g.set_endpoint(0, 2, Endpoint::Arrow).unwrap();
        g.set_endpoint(3, 2, Endpoint::Arrow).unwrap();
        g.add_nondirected_edge(3, 4).unwrap();
        let pds = possible_dsep(&g, 0, 1, None);
        // B is reached through the collider at A; C would need B to be a
        // collider or in a triangle.
        assert_eq!(pds.into_iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn path_limit_truncates() {
        let mut g = Graph::with_nodes(nodes_from_names(&["X", "Y", "A", "B"])).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g.add_nondirected_edge(0, 3).unwrap();
        g.add_nondirected_edge(0, 1).unwrap();
        assert!(possible_dsep(&g, 0, 1, Some(1)).iter().all(|&n| g.is_adjacent(0, n)));
    }
}
