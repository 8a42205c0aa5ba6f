//! Orientation engines.
//!
//! CPDAG side: background knowledge, sepset colliders, conservative
//! colliders, then Meek's rules. PAG side: [`FciOrient`] with R0 through R10.

mod colliders;
mod conservative;
pub mod fci;
mod knowledge;
mod meek;

use std::collections::BTreeSet;

use causa_core::graph::{Triple, TripleType};
use causa_core::traits::{SearchEvent, SearchObserver};
use causa_core::Graph;

pub use colliders::{orient_colliders_from_sepsets, ConflictPolicy};
pub use conservative::{classify_conservatively, orient_conservative_colliders};
pub use fci::FciOrient;
pub use knowledge::orient_by_knowledge;
pub use meek::MeekRules;

/// Every unshielded triple of a skeleton, sorted into three disjoint sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleClassification {
    pub colliders: BTreeSet<Triple>,
    pub noncolliders: BTreeSet<Triple>,
    pub ambiguous: BTreeSet<Triple>,
}

impl TripleClassification {
    pub fn insert(&mut self, triple: Triple, kind: TripleType) {
        match kind {
            TripleType::Collider => self.colliders.insert(triple),
            TripleType::Noncollider => self.noncolliders.insert(triple),
            TripleType::Ambiguous => self.ambiguous.insert(triple),
        };
    }

    pub fn kind_of(&self, triple: &Triple) -> Option<TripleType> {
        if self.colliders.contains(triple) {
            Some(TripleType::Collider)
        } else if self.noncolliders.contains(triple) {
            Some(TripleType::Noncollider)
        } else if self.ambiguous.contains(triple) {
            Some(TripleType::Ambiguous)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len() + self.noncolliders.len() + self.ambiguous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn report_triple(observer: &dyn SearchObserver, graph: &Graph, t: &Triple, kind: TripleType) {
    if observer.enabled() {
        observer.on_event(&SearchEvent::TripleClassified {
            x: graph.name(t.x).to_string(),
            y: graph.name(t.y).to_string(),
            z: graph.name(t.z).to_string(),
            kind,
        });
    }
}

pub(crate) fn report_rule(observer: &dyn SearchObserver, graph: &Graph, rule: &'static str, a: usize, b: usize) {
    if observer.enabled() {
        if let Some(edge) = graph.edge(a, b) {
            observer.on_event(&SearchEvent::RuleApplied {
                rule,
                edge: graph.edge_string(&edge),
            });
        }
    }
}
