//! Sepset-based collider orientation (the PC collider step).

use serde::{Deserialize, Serialize};

use causa_core::graph::{Endpoint, Triple, TripleType};
use causa_core::traits::{SearchEvent, SearchObserver};
use causa_core::{Graph, Knowledge, SearchResult, SepsetMap};

use super::{report_triple, TripleClassification};

/// What to do when a new collider would put an arrowhead where an earlier
/// collider already put one in the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the earlier orientation and skip the new collider.
    #[default]
    PrioritizeExisting,
    /// Allow both arrowheads, producing `<->`.
    OrientBidirected,
    /// Replace the earlier orientation.
    OverwriteExisting,
}

/// Classify every unshielded triple of `graph` by its sepset and orient the
/// colliders.
///
/// `<x, y, z>` is a noncollider when `y` is in `sepset(x, z)` and a collider
/// otherwise, including when no sepset was recorded. Triples are visited by
/// middle node, then `x`, then `z`, which fixes the outcome of conflicting
/// colliders. Classification depends only on the sepsets; orientation also
/// honors knowledge and the conflict policy.
pub fn orient_colliders_from_sepsets(
    graph: &mut Graph,
    sepsets: &SepsetMap,
    knowledge: &Knowledge,
    policy: ConflictPolicy,
    observer: &dyn SearchObserver,
) -> SearchResult<TripleClassification> {
    let _span = causa_core::orient_span!("colliders").entered();
    let mut classification = TripleClassification::default();
    for triple in graph.unshielded_triples() {
        let kind = match sepsets.is_in_sepset(triple.y, triple.x, triple.z) {
            Some(true) => TripleType::Noncollider,
            Some(false) | None => TripleType::Collider,
        };
        report_triple(observer, graph, &triple, kind);
        classification.insert(triple, kind);
        if kind == TripleType::Collider {
            orient_collider(graph, &triple, knowledge, policy, observer)?;
        }
    }
    Ok(classification)
}

/// `x --> y <-- z` is compatible with the knowledge.
pub(crate) fn collider_allowed(graph: &Graph, t: &Triple, knowledge: &Knowledge) -> bool {
    arrowhead_allowed(graph, t.x, t.y, knowledge) && arrowhead_allowed(graph, t.z, t.y, knowledge)
}

/// An arrowhead at `to` on `from *-> to` does not contradict the knowledge.
pub(crate) fn arrowhead_allowed(graph: &Graph, from: usize, to: usize, knowledge: &Knowledge) -> bool {
    !knowledge.requires(graph, to, from) && !knowledge.forbids(graph, from, to)
}

/// Put arrowheads at `y` on both edges of the triple, subject to the policy.
/// Returns whether the graph changed.
pub(crate) fn orient_collider(
    graph: &mut Graph,
    t: &Triple,
    knowledge: &Knowledge,
    policy: ConflictPolicy,
    observer: &dyn SearchObserver,
) -> SearchResult<bool> {
    if !collider_allowed(graph, t, knowledge) {
        return Ok(false);
    }
    let (x, y, z) = (t.x, t.y, t.z);
    let arrow_into_outer =
        graph.endpoint(y, x) == Some(Endpoint::Arrow) || graph.endpoint(y, z) == Some(Endpoint::Arrow);
    match policy {
        ConflictPolicy::PrioritizeExisting if arrow_into_outer => return Ok(false),
        ConflictPolicy::OverwriteExisting => {
            graph.set_endpoint(y, x, Endpoint::Tail)?;
            graph.set_endpoint(y, z, Endpoint::Tail)?;
        }
        _ => {}
    }
    if graph.is_def_collider(x, y, z) {
        return Ok(false);
    }
    graph.set_endpoint(x, y, Endpoint::Arrow)?;
    graph.set_endpoint(z, y, Endpoint::Arrow)?;
    if observer.enabled() {
        observer.on_event(&SearchEvent::ColliderOriented {
            x: graph.name(x).to_string(),
            y: graph.name(y).to_string(),
            z: graph.name(z).to_string(),
        });
    }
    Ok(true)
}
