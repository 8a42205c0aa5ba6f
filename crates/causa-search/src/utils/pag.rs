//! PAG legality and best-effort repair.
//!
//! A PAG is legal here when its directed part is acyclic, the MAG read off it
//! is ancestral, and that MAG has exactly the PAG's unshielded colliders.
//! Maximality of the MAG is not checked.

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;

use causa_core::constants::MAX_PAG_REPAIR_ITERATIONS;
use causa_core::errors::GraphError;
use causa_core::graph::{Endpoint, Triple};
use causa_core::{Graph, NodeId, SearchResult};

use crate::algorithms::SepsetProducer;
use crate::orient::FciOrient;

/// Read one MAG out of a PAG: half-circle edges take the mark opposite their
/// definite end (`o->` becomes `-->`, `--o` becomes `-->`), and the `o-o`
/// component is oriented along a maximum cardinality search order so no new
/// unshielded collider appears.
pub fn pag_to_mag(pag: &Graph) -> Result<Graph, GraphError> {
    use Endpoint::*;
    let mut mag = pag.clone();
    let mut circle_adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); pag.node_count()];
    for e in pag.edges() {
        let (a, b) = (e.node1, e.node2);
        let marked = match (e.endpoint1, e.endpoint2) {
            (Circle, Arrow) => mag.set_endpoint(b, a, Tail),
            (Arrow, Circle) => mag.set_endpoint(a, b, Tail),
            (Tail, Circle) => mag.set_endpoint(a, b, Arrow),
            (Circle, Tail) => mag.set_endpoint(b, a, Arrow),
            (Circle, Circle) => {
                circle_adjacency[a].push(b);
                circle_adjacency[b].push(a);
                Ok(())
            }
            _ => Ok(()),
        };
        marked?;
    }
    let order = maximum_cardinality_order(&circle_adjacency);
    let mut rank = vec![0usize; order.len()];
    for (i, &n) in order.iter().enumerate() {
        rank[n] = i;
    }
    for (a, neighbors) in circle_adjacency.iter().enumerate() {
        for &b in neighbors {
            if rank[a] < rank[b] {
                mag.orient(a, b)?;
            }
        }
    }
    Ok(mag)
}

/// Visit order of a maximum cardinality search; ties go to the lowest id.
fn maximum_cardinality_order(adjacency: &[Vec<NodeId>]) -> Vec<NodeId> {
    let n = adjacency.len();
    let mut weight = vec![0usize; n];
    let mut numbered = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for _ in 0..n {
        let next = (0..n)
            .filter(|&v| !numbered[v])
            .fold(None, |best: Option<NodeId>, v| match best {
                Some(b) if weight[b] >= weight[v] => Some(b),
                _ => Some(v),
            });
        let Some(v) = next else { break };
        numbered[v] = true;
        order.push(v);
        for &w in &adjacency[v] {
            if !numbered[w] {
                weight[w] += 1;
            }
        }
    }
    order
}

/// The graph is a mixed graph with no circles, no directed cycle, no almost
/// directed cycle, and no arrowhead into an endpoint of an undirected edge.
pub fn is_legal_mag(mag: &Graph) -> bool {
    let edges = mag.edges();
    if edges
        .iter()
        .any(|e| e.endpoint1 == Endpoint::Circle || e.endpoint2 == Endpoint::Circle)
    {
        return false;
    }
    if !mag.is_acyclic() {
        return false;
    }
    for e in &edges {
        let (a, b) = (e.node1, e.node2);
        if mag.is_bidirected(a, b) && (mag.exists_directed_path(a, b) || mag.exists_directed_path(b, a)) {
            return false;
        }
        if mag.is_undirected_from_to(a, b) {
            let arrow_into = |n: NodeId| mag.adjacent_iter(n).any(|m| mag.endpoint(m, n) == Some(Endpoint::Arrow));
            if arrow_into(a) || arrow_into(b) {
                return false;
            }
        }
    }
    true
}

pub fn is_legal_pag(pag: &Graph) -> bool {
    if !pag.is_acyclic() {
        return false;
    }
    let Ok(mag) = pag_to_mag(pag) else {
        return false;
    };
    if !is_legal_mag(&mag) {
        return false;
    }
    let colliders = |g: &Graph| -> BTreeSet<Triple> { g.unshielded_colliders().into_iter().collect() };
    colliders(&mag) == colliders(pag)
}

/// Best-effort repair of an orientation that is not a legal PAG.
///
/// Each pass turns `a <-> b` with `a ~~> b` into `a --> b`, demotes directed
/// edges inside directed cycles to `o->`, reopens undirected edges that have
/// arrowheads into their ends, and reruns the final FCI rules. Stops when
/// the graph is legal, when a pass finds nothing to repair, or after
/// `MAX_PAG_REPAIR_ITERATIONS` passes. Returns whether the result is legal.
pub fn guarantee_pag(graph: &mut Graph, orient: &FciOrient, sepsets: &dyn SepsetProducer) -> SearchResult<bool> {
    for pass in 0..MAX_PAG_REPAIR_ITERATIONS {
        if is_legal_pag(graph) {
            return Ok(true);
        }
        let mut repaired = 0;

        for e in graph.edges() {
            let (a, b) = (e.node1, e.node2);
            if !graph.is_bidirected(a, b) {
                continue;
            }
            if graph.exists_directed_path(a, b) {
                graph.set_endpoint(b, a, Endpoint::Tail)?;
                repaired += 1;
            } else if graph.exists_directed_path(b, a) {
                graph.set_endpoint(a, b, Endpoint::Tail)?;
                repaired += 1;
            }
        }

        let projection = graph.directed_projection();
        for component in tarjan_scc(&projection) {
            if component.len() < 2 {
                continue;
            }
            let members: BTreeSet<NodeId> = component.iter().map(|&ix| projection[ix]).collect();
            for &a in &members {
                for b in graph.children(a) {
                    if members.contains(&b) {
                        graph.set_endpoint(b, a, Endpoint::Circle)?;
                        repaired += 1;
                    }
                }
            }
        }

        for e in graph.edges() {
            let (a, b) = (e.node1, e.node2);
            if !graph.is_undirected_from_to(a, b) {
                continue;
            }
            let arrow_into = |n: NodeId| graph.adjacent_iter(n).any(|m| graph.endpoint(m, n) == Some(Endpoint::Arrow));
            if arrow_into(a) || arrow_into(b) {
                graph.set_edge(a, b, Endpoint::Circle, Endpoint::Circle)?;
                repaired += 1;
            }
        }

        tracing::debug!(pass, repaired, "PAG repair pass");
        if repaired == 0 {
            break;
        }
        orient.final_orientation(graph, sepsets)?;
    }
    let legal = is_legal_pag(graph);
    if !legal {
        tracing::warn!("orientation is not a legal PAG after repair; returning best effort");
    }
    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;
    use causa_core::Edge;

    fn graph(names: &[&str]) -> Graph {
        Graph::with_nodes(nodes_from_names(names)).unwrap()
    }

    #[test]
    fn circle_triangle_becomes_acyclic_mag() {
        let mut g = graph(&["A", "B", "C"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        let mag = pag_to_mag(&g).unwrap();
        assert!(mag.is_dag());
        assert!(is_legal_pag(&g));
    }

    #[test]
    fn collider_pag_is_legal() {
        // A o-> C <-o B
        let mut g = graph(&["A", "B", "C"]);
        g.add_edge(Edge::partially_oriented(0, 2)).unwrap();
        g.add_edge(Edge::partially_oriented(1, 2)).unwrap();
        assert!(is_legal_pag(&g));
        let mag = pag_to_mag(&g).unwrap();
        assert!(mag.is_directed_from_to(0, 2));
        assert!(mag.is_directed_from_to(1, 2));
    }

    #[test]
    fn directed_cycle_is_illegal() {
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_directed_edge(2, 0).unwrap();
        assert!(!is_legal_pag(&g));
    }

    #[test]
    fn almost_directed_cycle_is_illegal() {
        // A --> B --> C, A <-> C
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_bidirected_edge(0, 2).unwrap();
        assert!(!is_legal_mag(&g));
        assert!(!is_legal_pag(&g));
    }

    #[test]
    fn repair_fixes_almost_cycle() {
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_bidirected_edge(0, 2).unwrap();
        let mut orient = FciOrient::new();
        orient.set_observer(std::sync::Arc::new(causa_core::traits::NoopObserver));
        let legal = guarantee_pag(&mut g, &orient, &causa_core::SepsetMap::new()).unwrap();
        assert!(legal);
        assert!(g.is_directed_from_to(0, 2));
    }

    #[test]
    fn unshielded_circle_path_does_not_gain_colliders() {
        // A o-o B o-o C, A and C non-adjacent: MCS must not orient into B from both sides.
        let mut g = graph(&["A", "B", "C"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        let mag = pag_to_mag(&g).unwrap();
        assert!(mag.unshielded_colliders().is_empty());
    }
}
