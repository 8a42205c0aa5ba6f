//! Background-knowledge orientation for CPDAG searches.

use causa_core::traits::{SearchEvent, SearchObserver};
use causa_core::{Graph, Knowledge, SearchResult};

/// Orient adjacent pairs the knowledge decides: a required `from --> to` is
/// oriented that way, and a forbidden `from --> to` is oriented `to --> from`.
/// Returns the number of edges changed.
pub fn orient_by_knowledge(
    graph: &mut Graph,
    knowledge: &Knowledge,
    observer: &dyn SearchObserver,
) -> SearchResult<usize> {
    if knowledge.is_empty() {
        return Ok(0);
    }
    let mut changed = 0;
    let forbidden: Vec<(String, String)> = knowledge
        .forbidden_edges()
        .map(|(f, t)| (f.to_string(), t.to_string()))
        .collect();
    for (from, to) in &forbidden {
        changed += orient_pair(graph, to, from, observer)?;
    }
    // Tier constraints are not listed edge by edge.
    for edge in graph.edges() {
        let (a, b) = (edge.node1, edge.node2);
        let (na, nb) = (graph.name(a).to_string(), graph.name(b).to_string());
        if knowledge.is_forbidden(&na, &nb) && !knowledge.is_forbidden(&nb, &na) {
            changed += orient_pair(graph, &nb, &na, observer)?;
        } else if knowledge.is_forbidden(&nb, &na) && !knowledge.is_forbidden(&na, &nb) {
            changed += orient_pair(graph, &na, &nb, observer)?;
        }
    }
    let required: Vec<(String, String)> = knowledge
        .required_edges()
        .map(|(f, t)| (f.to_string(), t.to_string()))
        .collect();
    for (from, to) in &required {
        changed += orient_pair(graph, from, to, observer)?;
    }
    Ok(changed)
}

fn orient_pair(graph: &mut Graph, from: &str, to: &str, observer: &dyn SearchObserver) -> SearchResult<usize> {
    let (Some(a), Some(b)) = (graph.node_id(from), graph.node_id(to)) else {
        return Ok(0);
    };
    if !graph.is_adjacent(a, b) || graph.is_directed_from_to(a, b) {
        return Ok(0);
    }
    graph.orient(a, b)?;
    if observer.enabled() {
        if let Some(edge) = graph.edge(a, b) {
            observer.on_event(&SearchEvent::KnowledgeOriented {
                edge: graph.edge_string(&edge),
            });
        }
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;
    use causa_core::traits::NoopObserver;

    #[test]
    fn required_and_forbidden_orientations() {
        let mut g = Graph::complete_undirected(nodes_from_names(&["A", "B", "C"])).unwrap();
        let mut k = Knowledge::new();
        k.add_required("A", "B").unwrap();
        k.add_forbidden("C", "B").unwrap();
        let n = orient_by_knowledge(&mut g, &k, &NoopObserver).unwrap();
        assert_eq!(n, 2);
        assert!(g.is_directed_from_to(0, 1));
        assert!(g.is_directed_from_to(1, 2));
        assert!(g.is_undirected_from_to(0, 2));
    }

    #[test]
    fn tiers_orient_forward() {
        let mut g = Graph::complete_undirected(nodes_from_names(&["A", "B"])).unwrap();
        let mut k = Knowledge::new();
        k.add_to_tier(0, "B").unwrap();
        k.add_to_tier(1, "A").unwrap();
        orient_by_knowledge(&mut g, &k, &NoopObserver).unwrap();
        assert!(g.is_directed_from_to(1, 0));
    }
}
