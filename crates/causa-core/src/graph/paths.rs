//! Separation queries over mixed graphs.
//!
//! The reachability search walks edge pairs with an explicit stack, so
//! stack depth does not grow with path length.

use std::collections::HashSet;

use super::{Endpoint, Graph, NodeId};

/// `x` and `y` are m-connected given `z` (d-connected when the graph is a DAG).
///
/// A walk passes a non-collider that is not in `z`, and a collider that is an
/// ancestor of some member of `z`.
pub fn is_m_connected(graph: &Graph, x: NodeId, y: NodeId, z: &[NodeId]) -> bool {
    if x == y {
        return true;
    }
    let conditioned: HashSet<NodeId> = z.iter().copied().collect();
    if conditioned.contains(&x) || conditioned.contains(&y) {
        return false;
    }
    let ancestors_of_z = graph.ancestors_of(z);

    let mut visited: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut stack: Vec<(NodeId, NodeId)> = Vec::new();
    for b in graph.adjacent_iter(x) {
        if b == y {
            return true;
        }
        if visited.insert((x, b)) {
            stack.push((x, b));
        }
    }

    while let Some((a, b)) = stack.pop() {
        for c in graph.adjacent_iter(b) {
            if c == a {
                continue;
            }
            let collider = graph.endpoint(a, b) == Some(Endpoint::Arrow)
                && graph.endpoint(c, b) == Some(Endpoint::Arrow);
            let passable = if collider {
                ancestors_of_z.contains(&b)
            } else {
                !conditioned.contains(&b)
            };
            if !passable {
                continue;
            }
            if c == y {
                return true;
            }
            if visited.insert((b, c)) {
                stack.push((b, c));
            }
        }
    }
    false
}

/// Negation of [`is_m_connected`].
pub fn is_d_separated(graph: &Graph, x: NodeId, y: NodeId, z: &[NodeId]) -> bool {
    !is_m_connected(graph, x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::nodes_from_names;

    fn graph(names: &[&str], directed: &[(usize, usize)]) -> Graph {
        let mut g = Graph::with_nodes(nodes_from_names(names)).unwrap();
        for &(a, b) in directed {
            g.add_directed_edge(a, b).unwrap();
        }
        g
    }

    #[test]
    fn chain_is_blocked_by_middle() {
        let g = graph(&["A", "B", "C"], &[(0, 1), (1, 2)]);
        assert!(is_m_connected(&g, 0, 2, &[]));
        assert!(is_d_separated(&g, 0, 2, &[1]));
    }

    #[test]
    fn collider_opens_when_descendant_conditioned() {
        // A -> C <- B, C -> D
        let g = graph(&["A", "B", "C", "D"], &[(0, 2), (1, 2), (2, 3)]);
        assert!(is_d_separated(&g, 0, 1, &[]));
        assert!(is_m_connected(&g, 0, 1, &[2]));
        assert!(is_m_connected(&g, 0, 1, &[3]));
    }

    #[test]
    fn bidirected_edge_connects_marginally() {
        let mut g = graph(&["A", "B", "C"], &[(0, 1)]);
        g.add_bidirected_edge(1, 2).unwrap();
        // A -> B <-> C: B is a collider.
        assert!(is_d_separated(&g, 0, 2, &[]));
        assert!(is_m_connected(&g, 0, 2, &[1]));
    }
}
