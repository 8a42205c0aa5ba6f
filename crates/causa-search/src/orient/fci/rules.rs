//! R1-R3.

use causa_core::graph::Endpoint;
use causa_core::{Graph, SearchResult};

use super::{ordered_neighbor_pairs, FciOrient};

impl FciOrient {
    /// R1: `a *-> b o-* c`, `a` and `c` non-adjacent, gives `b --> c`.
    pub fn rule_r1(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for b in graph.node_ids() {
            for (a, c) in ordered_neighbor_pairs(graph, b) {
                if graph.endpoint(a, b) != Some(Endpoint::Arrow)
                    || graph.endpoint(c, b) != Some(Endpoint::Circle)
                    || graph.is_adjacent(a, c)
                {
                    continue;
                }
                if !self.arrowhead_allowed(graph, b, c) || !self.tail_allowed(graph, b, c) {
                    continue;
                }
                graph.set_endpoint(c, b, Endpoint::Tail)?;
                graph.set_endpoint(b, c, Endpoint::Arrow)?;
                self.report(graph, "R1", b, c);
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// R2: `a --> b *-> c` or `a *-> b --> c`, with `a *-o c`, gives `a *-> c`.
    pub fn rule_r2(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if graph.endpoint(a, c) != Some(Endpoint::Circle) {
                    continue;
                }
                let implied = graph.adjacent_nodes(a).into_iter().any(|b| {
                    b != c
                        && graph.is_adjacent(b, c)
                        && ((graph.is_directed_from_to(a, b) && graph.endpoint(b, c) == Some(Endpoint::Arrow))
                            || (graph.endpoint(a, b) == Some(Endpoint::Arrow) && graph.is_directed_from_to(b, c)))
                });
                if implied && self.arrowhead_allowed(graph, a, c) {
                    graph.set_endpoint(a, c, Endpoint::Arrow)?;
                    self.report(graph, "R2", a, c);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R3: `a *-> b <-* c`, `a *-o d o-* c`, `a` and `c` non-adjacent,
    /// `d *-o b`, gives `d *-> b`.
    pub fn rule_r3(&self, graph: &mut Graph) -> SearchResult<usize> {
        let mut changed = 0;
        for b in graph.node_ids() {
            for d in graph.adjacent_nodes(b) {
                if graph.endpoint(d, b) != Some(Endpoint::Circle) {
                    continue;
                }
                let candidates: Vec<_> = graph
                    .adjacent_iter(b)
                    .filter(|&n| n != d && graph.is_adjacent(n, d))
                    .filter(|&n| graph.endpoint(n, b) == Some(Endpoint::Arrow))
                    .filter(|&n| graph.endpoint(n, d) == Some(Endpoint::Circle))
                    .collect();
                let implied = candidates
                    .iter()
                    .enumerate()
                    .any(|(i, &a)| candidates[i + 1..].iter().any(|&c| !graph.is_adjacent(a, c)));
                if implied && self.arrowhead_allowed(graph, d, b) {
                    graph.set_endpoint(d, b, Endpoint::Arrow)?;
                    self.report(graph, "R3", d, b);
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
    fn r1_away_from_arrowhead() {
        // A *-> B o-o C
        let mut g = graph(&["A", "B", "C"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.set_endpoint(0, 1, Endpoint::Arrow).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        assert_eq!(orient().rule_r1(&mut g).unwrap(), 1);
        assert!(g.is_directed_from_to(1, 2));
    }

    #[test]
    fn r2_directed_then_arrow() {
        // A --> B o-> C, A o-o C
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        g.set_endpoint(1, 2, Endpoint::Arrow).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        orient().rule_r2(&mut g).unwrap();
        assert_eq!(g.endpoint(0, 2), Some(Endpoint::Arrow));
        assert_eq!(g.endpoint(2, 0), Some(Endpoint::Circle));
    }

    #[test]
    fn r3_circle_into_collider() {
        // A *-> B <-* C, A o-o D o-o C, D o-o B
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.set_endpoint(0, 1, Endpoint::Arrow).unwrap();
        g.add_nondirected_edge(2, 1).unwrap();
        g.set_endpoint(2, 1, Endpoint::Arrow).unwrap();
        g.add_nondirected_edge(0, 3).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g.add_nondirected_edge(3, 1).unwrap();
        assert_eq!(orient().rule_r3(&mut g).unwrap(), 1);
        assert_eq!(g.endpoint(3, 1), Some(Endpoint::Arrow));
    }
}
