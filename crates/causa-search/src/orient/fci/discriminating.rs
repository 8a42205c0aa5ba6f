//! R4, the discriminating path rule.
//!
//! A discriminating path `<theta, ..., a, b, c>` for `b` has `theta` and `c`
//! non-adjacent, and every node strictly between `theta` and `b` is a collider
//! on the path and a parent of `c`. The sepset of `theta` and `c` then decides
//! whether `b` is a collider.

use std::collections::{HashSet, VecDeque};

use causa_core::graph::Endpoint;
use causa_core::{Graph, NodeId, SearchResult};

use super::FciOrient;
use crate::algorithms::SepsetProducer;

/// Find the far end `theta` of a discriminating path `<theta, ..., a, b, c>`.
///
/// `a` must already be a parent of `c` with `b *-> a`. The search walks back
/// from `a` breadth-first through colliders that are parents of `c`, so the
/// first hit is on a shortest such path. `limit` bounds the path's edge count.
pub fn find_discriminating_path(
    graph: &Graph,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    limit: Option<usize>,
) -> Option<NodeId> {
    let mut visited: HashSet<NodeId> = [a, b, c].into_iter().collect();
    // (collider on the path, edges from it to c along the path)
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(a, 2)]);

    while let Some((q, dist)) = queue.pop_front() {
        for t in graph.adjacent_iter(q) {
            if visited.contains(&t) || graph.endpoint(t, q) != Some(Endpoint::Arrow) {
                continue;
            }
            let len = dist + 1;
            if limit.is_some_and(|l| len > l) {
                continue;
            }
            if !graph.is_adjacent(t, c) {
                return Some(t);
            }
            if graph.is_directed_from_to(t, c) && graph.endpoint(q, t) == Some(Endpoint::Arrow) {
                visited.insert(t);
                queue.push_back((t, len));
            }
        }
    }
    None
}

impl FciOrient {
    /// R4: for `b o-* c` at the end of a discriminating path, orient `b --> c`
    /// if `b` is in `sepset(theta, c)` and `a <-> b <-> c` otherwise.
    pub fn rule_r4(&self, graph: &mut Graph, sepsets: &dyn SepsetProducer) -> SearchResult<usize> {
        let limit = self.path_limit();
        let mut changed = 0;
        for c in graph.node_ids() {
            for b in graph.adjacent_nodes(c) {
                if graph.endpoint(c, b) != Some(Endpoint::Circle) {
                    continue;
                }
                for a in graph.adjacent_nodes(b) {
                    if graph.endpoint(c, b) != Some(Endpoint::Circle) {
                        break;
                    }
                    if a == c
                        || !graph.is_directed_from_to(a, c)
                        || graph.endpoint(b, a) != Some(Endpoint::Arrow)
                    {
                        continue;
                    }
                    let Some(theta) = find_discriminating_path(graph, a, b, c, limit) else {
                        continue;
                    };
                    let Some(sepset) = sepsets.sepset(graph, theta, c) else {
                        continue;
                    };
                    if sepset.contains(&b) {
                        if self.arrowhead_allowed(graph, b, c) && self.tail_allowed(graph, b, c) {
                            graph.set_endpoint(c, b, Endpoint::Tail)?;
                            graph.set_endpoint(b, c, Endpoint::Arrow)?;
                            self.report(graph, "R4", b, c);
                            changed += 1;
                        }
                    } else if self.arrowhead_allowed(graph, a, b) && self.arrowhead_allowed(graph, c, b) {
                        graph.set_endpoint(a, b, Endpoint::Arrow)?;
                        graph.set_endpoint(c, b, Endpoint::Arrow)?;
                        if self.arrowhead_allowed(graph, b, c) {
                            graph.set_endpoint(b, c, Endpoint::Arrow)?;
                        }
                        self.report(graph, "R4", b, c);
                        changed += 1;
                    }
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
    use causa_core::SepsetMap;

    /// theta *-> a <-> b, a --> c, b o-o c, theta and c non-adjacent.
    fn discriminating() -> Graph {
        let mut g = Graph::with_nodes(nodes_from_names(&["T", "A", "B", "C"])).unwrap();
        g.add_nondirected_edge(0, 1).unwrap();
        g.set_endpoint(0, 1, Endpoint::Arrow).unwrap();
        g.add_bidirected_edge(1, 2).unwrap();
        g.add_directed_edge(1, 3).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g
    }

    fn orient() -> FciOrient {
        let mut o = FciOrient::new();
        o.set_observer(Arc::new(NoopObserver));
        o
    }

    #[test]
    fn finds_theta() {
        let g = discriminating();
        assert_eq!(find_discriminating_path(&g, 1, 2, 3, None), Some(0));
        // The path has three edges.
        assert_eq!(find_discriminating_path(&g, 1, 2, 3, Some(2)), None);
    }

    #[test]
    fn middle_in_sepset_gives_tail() {
        let mut g = discriminating();
        let sepsets = SepsetMap::new();
        sepsets.set(0, 3, Some(vec![1, 2]));
        assert_eq!(orient().rule_r4(&mut g, &sepsets).unwrap(), 1);
        assert!(g.is_directed_from_to(2, 3));
    }

    #[test]
    fn middle_outside_sepset_gives_collider() {
        let mut g = discriminating();
        let sepsets = SepsetMap::new();
        sepsets.set(0, 3, Some(vec![1]));
        orient().rule_r4(&mut g, &sepsets).unwrap();
        assert!(g.is_bidirected(2, 3));
        assert!(g.is_bidirected(1, 2));
    }
}
