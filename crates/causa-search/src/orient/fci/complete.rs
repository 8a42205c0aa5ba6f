//! Zhang's R5-R10. Only run under the complete rule set.

use causa_core::graph::Endpoint;
use causa_core::{Graph, NodeId, SearchResult};

use super::{is_nondirected, ordered_neighbor_pairs, FciOrient};

/// Edge `u *-* v` can lie on a potentially directed path from `u` to `v`:
/// no arrowhead at `u` and no tail at `v`.
fn potentially_directed(graph: &Graph, u: NodeId, v: NodeId) -> bool {
    matches!(graph.endpoint(v, u), Some(Endpoint::Tail) | Some(Endpoint::Circle))
        && matches!(graph.endpoint(u, v), Some(Endpoint::Arrow) | Some(Endpoint::Circle))
}

/// `a o-> c`
fn is_partially_oriented(graph: &Graph, a: NodeId, c: NodeId) -> bool {
    graph.endpoint(c, a) == Some(Endpoint::Circle) && graph.endpoint(a, c) == Some(Endpoint::Arrow)
}

/// Search for an uncovered path `<start, first, ..., target>` whose edges all
/// satisfy `edge_ok`. Every consecutive triple on it is unshielded. `accept`
/// gets the complete path and may reject it. Depth-first with an explicit
/// stack; `limit` bounds the edge count.
#[allow(clippy::too_many_arguments)]
fn uncovered_path<E, A>(
    graph: &Graph,
    start: NodeId,
    first: NodeId,
    target: NodeId,
    avoid: &[NodeId],
    limit: Option<usize>,
    edge_ok: E,
    accept: A,
) -> Option<Vec<NodeId>>
where
    E: Fn(NodeId, NodeId) -> bool,
    A: Fn(&[NodeId]) -> bool,
{
    if !edge_ok(start, first) {
        return None;
    }
    if first == target {
        let path = vec![start, first];
        return accept(&path).then_some(path);
    }
    let mut stack: Vec<Vec<NodeId>> = vec![vec![start, first]];
    while let Some(path) = stack.pop() {
        if limit.is_some_and(|l| path.len() > l) {
            continue;
        }
        let (prev, last) = (path[path.len() - 2], path[path.len() - 1]);
        for next in graph.adjacent_iter(last) {
            if path.contains(&next) || avoid.contains(&next) {
                continue;
            }
            if graph.is_adjacent(prev, next) || !edge_ok(last, next) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(next);
            if next == target {
                if accept(&extended) {
                    return Some(extended);
                }
                continue;
            }
            stack.push(extended);
        }
    }
    None
}

impl FciOrient {
    /// R5: `a o-o b` closing an uncovered circle path `<a, c, ..., d, b>` with
    /// `a`, `d` and `c`, `b` non-adjacent becomes `a --- b`, and so does every
    /// edge on the path.
    pub fn rule_r5(&self, graph: &mut Graph) -> SearchResult<usize> {
        let limit = self.path_limit();
        let mut changed = 0;
        for edge in graph.edges() {
            let (a, b) = (edge.node1, edge.node2);
            if !is_nondirected(graph, a, b) {
                continue;
            }
            let found = graph
                .adjacent_nodes(a)
                .into_iter()
                .filter(|&c| c != b && !graph.is_adjacent(c, b))
                .find_map(|c| {
                    uncovered_path(
                        graph,
                        a,
                        c,
                        b,
                        &[],
                        limit,
                        |u, v| is_nondirected(graph, u, v),
                        |p| !graph.is_adjacent(p[p.len() - 2], a),
                    )
                });
            let Some(path) = found else {
                continue;
            };
            graph.set_edge(a, b, Endpoint::Tail, Endpoint::Tail)?;
            for pair in path.windows(2) {
                graph.set_edge(pair[0], pair[1], Endpoint::Tail, Endpoint::Tail)?;
            }
            self.report(graph, "R5", a, b);
            changed += 1;
        }
        Ok(changed)
    }

    /// R6: `a --- b o-* c` gives `b --* c`.
    pub fn rule_r6(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for b in graph.node_ids() {
            for (a, c) in ordered_neighbor_pairs(graph, b) {
                if graph.is_undirected_from_to(a, b)
                    && graph.endpoint(c, b) == Some(Endpoint::Circle)
                    && self.tail_allowed(graph, b, c)
                {
                    graph.set_endpoint(c, b, Endpoint::Tail)?;
                    self.report(graph, "R6", b, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R7: `a --o b o-* c`, `a` and `c` non-adjacent, gives `b --* c`.
    pub fn rule_r7(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for b in graph.node_ids() {
            for (a, c) in ordered_neighbor_pairs(graph, b) {
                if graph.endpoint(b, a) == Some(Endpoint::Tail)
                    && graph.endpoint(a, b) == Some(Endpoint::Circle)
                    && graph.endpoint(c, b) == Some(Endpoint::Circle)
                    && !graph.is_adjacent(a, c)
                    && self.tail_allowed(graph, b, c)
                {
                    graph.set_endpoint(c, b, Endpoint::Tail)?;
                    self.report(graph, "R7", b, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R8: `a --> b --> c` or `a --o b --> c`, with `a o-> c`, gives `a --> c`.
    pub fn rule_r8(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !is_partially_oriented(graph, a, c) {
                    continue;
                }
                let implied = graph.adjacent_nodes(a).into_iter().any(|b| {
                    b != c
                        && graph.endpoint(b, a) == Some(Endpoint::Tail)
                        && matches!(graph.endpoint(a, b), Some(Endpoint::Arrow) | Some(Endpoint::Circle))
                        && graph.is_directed_from_to(b, c)
                });
                if implied && self.tail_allowed(graph, a, c) {
                    graph.set_endpoint(c, a, Endpoint::Tail)?;
                    self.report(graph, "R8", a, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R9: `a o-> c` with an uncovered potentially directed path
    /// `<a, b, ..., c>`, `b` and `c` non-adjacent, gives `a --> c`.
    pub fn rule_r9(&self, graph: &mut Graph) -> SearchResult<usize> {
        let limit = self.path_limit();
        let mut changed = 0;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !is_partially_oriented(graph, a, c) {
                    continue;
                }
                let implied = graph
                    .adjacent_nodes(a)
                    .into_iter()
                    .filter(|&b| b != c && !graph.is_adjacent(b, c))
                    .any(|b| {
                        uncovered_path(
                            graph,
                            a,
                            b,
                            c,
                            &[],
                            limit,
                            |u, v| potentially_directed(graph, u, v),
                            |_| true,
                        )
                        .is_some()
                    });
                if implied && self.tail_allowed(graph, a, c) {
                    graph.set_endpoint(c, a, Endpoint::Tail)?;
                    self.report(graph, "R9", a, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R10: `a o-> c`, `b --> c <-- d`, uncovered potentially directed paths
    /// from `a` to `b` and from `a` to `d` whose second nodes `mu` and `omega`
    /// are distinct and non-adjacent, gives `a --> c`.
    pub fn rule_r10(&self, graph: &mut Graph) -> SearchResult<usize> {
        let limit = self.path_limit();
        let mut changed = 0;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !is_partially_oriented(graph, a, c) {
                    continue;
                }
                let parents: Vec<NodeId> = graph.parents(c).into_iter().filter(|&p| p != a).collect();
                if parents.len() < 2 {
                    continue;
                }
                // For each parent of c, the neighbors of a that start an
                // uncovered p.d. path to it.
                let starts: Vec<Vec<NodeId>> = parents
                    .iter()
                    .map(|&target| {
                        graph
                            .adjacent_iter(a)
                            .filter(|&mu| mu != c)
                            .filter(|&mu| {
                                uncovered_path(
                                    graph,
                                    a,
                                    mu,
                                    target,
                                    &[c],
                                    limit,
                                    |u, v| potentially_directed(graph, u, v),
                                    |_| true,
                                )
                                .is_some()
                            })
                            .collect()
                    })
                    .collect();
                let implied = (0..parents.len()).any(|i| {
                    ((i + 1)..parents.len()).any(|j| {
                        starts[i].iter().any(|&mu| {
                            starts[j]
                                .iter()
                                .any(|&omega| mu != omega && !graph.is_adjacent(mu, omega))
                        })
                    })
                });
                if implied && self.tail_allowed(graph, a, c) {
                    graph.set_endpoint(c, a, Endpoint::Tail)?;
                    self.report(graph, "R10", a, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use causa_core::graph::nodes_from_names;
    use causa_core::traits::NoopObserver;

    fn orient() -> FciOrient {
        let mut o = FciOrient::new();
        o.set_observer(Arc::new(NoopObserver));
        o
    }

    fn graph(names: &[&str]) -> Graph {
        Graph::with_nodes(nodes_from_names(names)).unwrap()
    }

    #[test]
    fn r5_uncovered_circle_cycle() {
        // A o-o B closes the circle path A o-o C o-o D o-o B.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g.add_nondirected_edge(3, 1).unwrap();
        assert_eq!(orient().rule_r5(&mut g).unwrap(), 1);
        assert!(g.is_undirected_from_to(0, 1));
        assert!(g.is_undirected_from_to(0, 2));
        assert!(g.is_undirected_from_to(2, 3));
        assert!(g.is_undirected_from_to(3, 1));
    }

    #[test]
    fn r6_tail_propagates() {
        // A --- B o-> C
        let mut g = graph(&["A", "B", "C"]);
        g.add_undirected_edge(0, 1).unwrap();
        g.add_edge(causa_core::Edge::partially_oriented(1, 2)).unwrap();
        orient().rule_r6(&mut g).unwrap();
        assert!(g.is_directed_from_to(1, 2));
    }

    #[test]
    fn r8_transitive_tail() {
        // A --> B --> C, A o-> C
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_edge(causa_core::Edge::partially_oriented(0, 2)).unwrap();
        assert_eq!(orient().rule_r8(&mut g).unwrap(), 1);
        assert!(g.is_directed_from_to(0, 2));
    }

    #[test]
    fn r9_uncovered_potentially_directed_path() {
        // A o-> C, A o-o B, B o-> D, D --> C; B and C non-adjacent, A and D non-adjacent.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_edge(causa_core::Edge::partially_oriented(0, 2)).unwrap();
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_edge(causa_core::Edge::partially_oriented(1, 3)).unwrap();
        g.add_directed_edge(3, 2).unwrap();
        assert_eq!(orient().rule_r9(&mut g).unwrap(), 1);
        assert!(g.is_directed_from_to(0, 2));
    }

    #[test]
    fn r10_two_parents_reached_from_separate_neighbors() {
        // A o-> C, B --> C <-- D, A o-> B, A o-> D, B and D non-adjacent.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_edge(causa_core::Edge::partially_oriented(0, 2)).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_directed_edge(3, 2).unwrap();
        g.add_edge(causa_core::Edge::partially_oriented(0, 1)).unwrap();
        g.add_edge(causa_core::Edge::partially_oriented(0, 3)).unwrap();
        assert_eq!(orient().rule_r10(&mut g).unwrap(), 1);
        assert!(g.is_directed_from_to(0, 2));
    }

    #[test]
    fn potentially_directed_marks() {
        let mut g = graph(&["A", "B"]);
        g.add_edge(causa_core::Edge::partially_oriented(0, 1)).unwrap();
        assert!(potentially_directed(&g, 0, 1));
        assert!(!potentially_directed(&g, 1, 0));
    }
}
