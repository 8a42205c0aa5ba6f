//! FCI orientation: R0 colliders, background knowledge, and the final
//! orientation rules (R1-R4, plus Zhang's R5-R10 under the complete rule set).

mod complete;
mod discriminating;
mod rules;

use std::sync::Arc;

use causa_core::config::{depth_limit, validate_path_length};
use causa_core::constants::{MAX_ORIENTATION_SWEEPS, UNBOUNDED};
use causa_core::errors::ConfigError;
use causa_core::graph::Endpoint;
use causa_core::traits::{SearchEvent, SearchObserver, TracingObserver};
use causa_core::{Graph, Knowledge, NodeId, SearchResult};

use crate::algorithms::SepsetProducer;

pub use discriminating::find_discriminating_path;

/// Orients a PAG skeleton whose edges start as `o-o`.
///
/// Tails and arrowheads, once placed, are never replaced by a rule; rules
/// only turn circles into marks. Sepset questions go through a
/// [`SepsetProducer`], which is a recorded [`causa_core::SepsetMap`] for FCI
/// and a test-driven search for GFCI.
pub struct FciOrient {
    knowledge: Arc<Knowledge>,
    complete_rule_set: bool,
    discriminating_path_rule: bool,
    max_path_length: i32,
    observer: Arc<dyn SearchObserver>,
}

impl Default for FciOrient {
    fn default() -> Self {
        Self {
            knowledge: Arc::new(Knowledge::new()),
            complete_rule_set: causa_core::config::defaults::DEFAULT_COMPLETE_RULE_SET,
            discriminating_path_rule: causa_core::config::defaults::DEFAULT_DISCRIMINATING_PATH_RULE,
            max_path_length: UNBOUNDED,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl FciOrient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_knowledge(&mut self, knowledge: Arc<Knowledge>) {
        self.knowledge = knowledge;
    }

    /// Use R5-R10 in addition to R1-R4.
    pub fn set_complete_rule_set(&mut self, complete: bool) {
        self.complete_rule_set = complete;
    }

    pub fn set_discriminating_path_rule(&mut self, enabled: bool) {
        self.discriminating_path_rule = enabled;
    }

    /// Longest path, in edges, the path-based rules will consider. -1 is unbounded.
    pub fn set_max_path_length(&mut self, length: i32) -> Result<(), ConfigError> {
        validate_path_length(length)?;
        self.max_path_length = length;
        Ok(())
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SearchObserver>) {
        self.observer = observer;
    }

    pub fn complete_rule_set(&self) -> bool {
        self.complete_rule_set
    }

    pub(crate) fn path_limit(&self) -> Option<usize> {
        depth_limit(self.max_path_length)
    }

    /// Knowledge, R0, then the final rules.
    pub fn orient(&self, graph: &mut Graph, sepsets: &dyn SepsetProducer) -> SearchResult<()> {
        self.orient_by_knowledge(graph)?;
        self.rule_r0(graph, sepsets)?;
        self.final_orientation(graph, sepsets)?;
        Ok(())
    }

    /// Forbidden `from --> to` puts an arrowhead at `from`; required
    /// `from --> to` orients the edge outright.
    pub fn orient_by_knowledge(&self, graph: &mut Graph) -> SearchResult<usize> {
        if self.knowledge.is_empty() {
            return Ok(0);
        }
        let mut changed = 0;
        for edge in graph.edges() {
            let (a, b) = (edge.node1, edge.node2);
            for (from, to) in [(a, b), (b, a)] {
                if self.knowledge.forbids(graph, from, to) && graph.endpoint(to, from) != Some(Endpoint::Arrow) {
                    graph.set_endpoint(to, from, Endpoint::Arrow)?;
                    self.report_knowledge(graph, from, to);
                    changed += 1;
                }
                if self.knowledge.requires(graph, from, to) && !graph.is_directed_from_to(from, to) {
                    graph.orient(from, to)?;
                    self.report_knowledge(graph, from, to);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// R0: orient `x *-> y <-* z` for every unshielded triple whose middle is
    /// not in the sepset of its ends.
    pub fn rule_r0(&self, graph: &mut Graph, sepsets: &dyn SepsetProducer) -> SearchResult<usize> {
        let _span = causa_core::orient_span!("fci-r0").entered();
        let mut oriented = 0;
        for t in graph.unshielded_triples() {
            if graph.is_def_collider(t.x, t.y, t.z) {
                continue;
            }
            let Some(sepset) = sepsets.sepset(graph, t.x, t.z) else {
                continue;
            };
            if sepset.contains(&t.y) {
                continue;
            }
            if self.orient_collider(graph, t.x, t.y, t.z)? {
                oriented += 1;
            }
        }
        Ok(oriented)
    }

    /// Put arrowheads at `b` on `a *-* b` and `c *-* b` if both are allowed.
    pub(crate) fn orient_collider(&self, graph: &mut Graph, a: NodeId, b: NodeId, c: NodeId) -> SearchResult<bool> {
        if !self.arrowhead_allowed(graph, a, b) || !self.arrowhead_allowed(graph, c, b) {
            return Ok(false);
        }
        graph.set_endpoint(a, b, Endpoint::Arrow)?;
        graph.set_endpoint(c, b, Endpoint::Arrow)?;
        if self.observer.enabled() {
            self.observer.on_event(&SearchEvent::ColliderOriented {
                x: graph.name(a).to_string(),
                y: graph.name(b).to_string(),
                z: graph.name(c).to_string(),
            });
        }
        Ok(true)
    }

    /// Apply the final rules until none fires. Returns the number of
    /// endpoint changes.
    pub fn final_orientation(&self, graph: &mut Graph, sepsets: &dyn SepsetProducer) -> SearchResult<usize> {
        let _span = causa_core::orient_span!("fci-final").entered();
        let mut total = 0;
        for _ in 0..MAX_ORIENTATION_SWEEPS {
            let mut changed = self.rule_r1(graph)?;
            changed += self.rule_r2(graph)?;
            changed += self.rule_r3(graph)?;
            if self.discriminating_path_rule {
                changed += self.rule_r4(graph, sepsets)?;
            }
            if self.complete_rule_set {
                changed += self.rule_r5(graph)?;
                changed += self.rule_r6(graph)?;
                changed += self.rule_r7(graph)?;
                changed += self.rule_r8(graph)?;
                changed += self.rule_r9(graph)?;
                changed += self.rule_r10(graph)?;
            }
            if changed == 0 {
                return Ok(total);
            }
            total += changed;
        }
        tracing::warn!(total, "FCI rules stopped before reaching a fixed point");
        Ok(total)
    }

    /// An arrowhead may go at `y` on `x *-* y`: the mark there is not a tail
    /// and knowledge does not require `y --> x`.
    pub(crate) fn arrowhead_allowed(&self, graph: &Graph, x: NodeId, y: NodeId) -> bool {
        match graph.endpoint(x, y) {
            Some(Endpoint::Arrow) => true,
            Some(Endpoint::Circle) => !self.knowledge.requires(graph, y, x),
            _ => false,
        }
    }

    /// A tail may go at `x` on `x *-* y`: the mark there is not an arrowhead
    /// and knowledge does not forbid `x --> y`.
    pub(crate) fn tail_allowed(&self, graph: &Graph, x: NodeId, y: NodeId) -> bool {
        match graph.endpoint(y, x) {
            Some(Endpoint::Tail) => true,
            Some(Endpoint::Circle) => !self.knowledge.forbids(graph, x, y),
            _ => false,
        }
    }

    pub(crate) fn report(&self, graph: &Graph, rule: &'static str, a: NodeId, b: NodeId) {
        crate::orient::report_rule(self.observer.as_ref(), graph, rule, a, b);
    }

    fn report_knowledge(&self, graph: &Graph, a: NodeId, b: NodeId) {
        if self.observer.enabled() {
            if let Some(edge) = graph.edge(a, b) {
                self.observer.on_event(&SearchEvent::KnowledgeOriented {
                    edge: graph.edge_string(&edge),
                });
            }
        }
    }
}

/// `a o-o b`
pub(crate) fn is_nondirected(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph.endpoint(a, b) == Some(Endpoint::Circle) && graph.endpoint(b, a) == Some(Endpoint::Circle)
}

/// Every pair of distinct neighbors of `b`, as ordered pairs.
pub(crate) fn ordered_neighbor_pairs(graph: &Graph, b: NodeId) -> Vec<(NodeId, NodeId)> {
    let adj = graph.adjacent_nodes(b);
    let mut pairs = Vec::with_capacity(adj.len() * adj.len().saturating_sub(1));
    for &a in &adj {
        for &c in &adj {
            if a != c {
                pairs.push((a, c));
            }
        }
    }
    pairs
}
