//! Conservative collider classification (CPC).
//!
//! Instead of trusting the one sepset adjacency search happened to record,
//! every conditioning set drawn from the final adjacencies of either endpoint
//! is tried. A triple is a collider only if separating sets exist and none
//! contains the middle node, a noncollider only if all of them do, and
//! ambiguous otherwise.

use causa_core::config::depth_limit;
use causa_core::graph::{Triple, TripleType};
use causa_core::traits::{IndependenceTest, SearchObserver};
use causa_core::{Graph, Knowledge, NodeId, SearchResult};

use super::colliders::orient_collider;
use super::{report_triple, ConflictPolicy, TripleClassification};
use crate::fas::subsets::subsets_up_to;

/// Classify every unshielded triple of the skeleton `graph` by testing all
/// candidate sepsets of `x` and `z` up to `depth` (-1 unbounded).
///
/// When no separating set is found among the final adjacencies there is no
/// evidence either way and the triple is ambiguous.
pub fn classify_conservatively(
    graph: &Graph,
    test: &dyn IndependenceTest,
    depth: i32,
    observer: &dyn SearchObserver,
) -> TripleClassification {
    let _span = causa_core::orient_span!("conservative").entered();
    let limit = depth_limit(depth);
    let mut classification = TripleClassification::default();
    for triple in graph.unshielded_triples() {
        let kind = classify_triple(graph, test, &triple, limit);
        report_triple(observer, graph, &triple, kind);
        classification.insert(triple, kind);
    }
    classification
}

fn classify_triple(graph: &Graph, test: &dyn IndependenceTest, t: &Triple, limit: Option<usize>) -> TripleType {
    let (x, y, z) = (t.x, t.y, t.z);
    let mut with_y = 0usize;
    let mut without_y = 0usize;
    for side in [x, z] {
        let pool: Vec<NodeId> = graph
            .adjacent_iter(side)
            .filter(|&n| n != x && n != z)
            .collect();
        let max = limit.unwrap_or(pool.len());
        for cond in subsets_up_to(&pool, max) {
            if test.is_independent(x, z, &cond) {
                if cond.contains(&y) {
                    with_y += 1;
                } else {
                    without_y += 1;
                }
            }
        }
        if with_y > 0 && without_y > 0 {
            break;
        }
    }
    match (with_y > 0, without_y > 0) {
        (true, false) => TripleType::Noncollider,
        (false, true) => TripleType::Collider,
        _ => TripleType::Ambiguous,
    }
}

/// Orient the classification's colliders. Ambiguous and noncollider triples
/// are left alone. Returns the number of colliders actually oriented.
pub fn orient_conservative_colliders(
    graph: &mut Graph,
    classification: &TripleClassification,
    knowledge: &Knowledge,
    policy: ConflictPolicy,
    observer: &dyn SearchObserver,
) -> SearchResult<usize> {
    // BTreeSet<Triple> order is (x, y, z); orient in middle-node order instead.
    let mut colliders: Vec<&Triple> = classification.colliders.iter().collect();
    colliders.sort_by_key(|t| (t.y, t.x, t.z));
    let mut oriented = 0;
    for t in colliders {
        if orient_collider(graph, t, knowledge, policy, observer)? {
            oriented += 1;
        }
    }
    Ok(oriented)
}
