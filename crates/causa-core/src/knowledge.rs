//! Background knowledge: forbidden and required directed edges plus tiers.
//!
//! Everything is keyed by node name so one `Knowledge` value can be shared
//! across graphs with different node orderings. Read-only during search.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::KnowledgeError;
use crate::graph::{Graph, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    forbidden: BTreeSet<(String, String)>,
    required: BTreeSet<(String, String)>,
    /// Node name -> tier index. Edges from a later tier into an earlier one
    /// are forbidden.
    tiers: BTreeMap<String, usize>,
    /// Tiers whose members may not be connected to each other.
    forbidden_within: BTreeSet<usize>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing constrains any edge.
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tiers.is_empty()
    }

    pub fn add_forbidden(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        if from == to {
            return Err(KnowledgeError::SelfReference(from.to_string()));
        }
        if self.is_required(from, to) {
            return Err(KnowledgeError::Conflict {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.forbidden.insert((from.to_string(), to.to_string()));
        Ok(())
    }

    pub fn add_required(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        if from == to {
            return Err(KnowledgeError::SelfReference(from.to_string()));
        }
        if self.is_forbidden(from, to) {
            return Err(KnowledgeError::Conflict {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.required.insert((from.to_string(), to.to_string()));
        Ok(())
    }

    pub fn remove_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.remove(&(from.to_string(), to.to_string()));
    }

    pub fn remove_required(&mut self, from: &str, to: &str) {
        self.required.remove(&(from.to_string(), to.to_string()));
    }

    /// Place `name` in `tier`. Fails if a required edge would become forbidden.
    pub fn add_to_tier(&mut self, tier: usize, name: &str) -> Result<(), KnowledgeError> {
        if let Some(&existing) = self.tiers.get(name) {
            return Err(KnowledgeError::AlreadyTiered {
                name: name.to_string(),
                tier: existing,
            });
        }
        self.tiers.insert(name.to_string(), tier);
        if let Some((from, to)) = self
            .required
            .iter()
            .find(|(f, t)| self.tier_forbids(f, t))
            .cloned()
        {
            self.tiers.remove(name);
            return Err(KnowledgeError::Conflict { from, to });
        }
        Ok(())
    }

    /// Forbid edges between members of `tier`.
    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) {
        if forbidden {
            self.forbidden_within.insert(tier);
        } else {
            self.forbidden_within.remove(&tier);
        }
    }

    pub fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers.get(name).copied()
    }

    /// `from --> to` is not allowed.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        self.forbidden.contains(&(from.to_string(), to.to_string())) || self.tier_forbids(from, to)
    }

    /// `from --> to` must be present.
    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    /// Neither direction is allowed, so the adjacency itself is ruled out.
    pub fn is_forbidden_both_ways(&self, a: &str, b: &str) -> bool {
        self.is_forbidden(a, b) && self.is_forbidden(b, a)
    }

    /// Some direction between `a` and `b` is required.
    pub fn is_required_either_way(&self, a: &str, b: &str) -> bool {
        self.is_required(a, b) || self.is_required(b, a)
    }

    // Id-based shorthands against a graph's node names.

    pub fn forbids(&self, graph: &Graph, from: NodeId, to: NodeId) -> bool {
        !self.is_empty() && self.is_forbidden(graph.name(from), graph.name(to))
    }

    pub fn requires(&self, graph: &Graph, from: NodeId, to: NodeId) -> bool {
        !self.required.is_empty() && self.is_required(graph.name(from), graph.name(to))
    }

    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    fn tier_forbids(&self, from: &str, to: &str) -> bool {
        match (self.tiers.get(from), self.tiers.get(to)) {
            (Some(&tf), Some(&tt)) => tf > tt || (tf == tt && self.forbidden_within.contains(&tf)),
            _ => false,
        }
    }
}
