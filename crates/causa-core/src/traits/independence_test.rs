use std::sync::atomic::{AtomicU64, Ordering};

use crate::graph::{Node, NodeId};

/// Outcome of one conditional independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndependenceResult {
    pub independent: bool,
    /// NaN when the statistic was undefined.
    pub p_value: f64,
}

impl IndependenceResult {
    pub fn new(independent: bool, p_value: f64) -> Self {
        Self {
            independent,
            p_value,
        }
    }

    /// Independent iff `p_value > alpha`.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        Self::new(p_value > alpha, p_value)
    }

    /// Sentinel for an undefined statistic: reported as independent so the
    /// adjacency search removes the edge instead of failing.
    pub fn degenerate() -> Self {
        Self::new(true, f64::NAN)
    }

    pub fn is_degenerate(&self) -> bool {
        self.p_value.is_nan()
    }
}

/// Answers "is X independent of Y given Z?" over a fixed list of variables.
///
/// Node ids index into [`IndependenceTest::variables`]. Implementations must
/// be `Send + Sync` because the concurrent adjacency search shares one test
/// across worker threads.
pub trait IndependenceTest: Send + Sync {
    fn variables(&self) -> &[Node];

    fn check_independence(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> IndependenceResult;

    fn is_independent(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> bool {
        self.check_independence(x, y, z).independent
    }

    /// Significance level.
    fn alpha(&self) -> f64;

    /// p-value of the most recent test on any thread, for diagnostics.
    fn last_p_value(&self) -> Option<f64>;

    /// Human-readable test name.
    fn name(&self) -> &str;

    fn variable_id(&self, name: &str) -> Option<NodeId> {
        self.variables().iter().position(|n| n.name() == name)
    }
}

/// Lock-free cell holding the last p-value a test produced.
#[derive(Debug)]
pub struct LastPValue(AtomicU64);

/// Bit pattern never produced by `f64::to_bits` on a computed p-value.
const UNSET: u64 = u64::MAX;

impl LastPValue {
    pub fn new() -> Self {
        Self(AtomicU64::new(UNSET))
    }

    pub fn store(&self, p: f64) {
        self.0.store(p.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> Option<f64> {
        match self.0.load(Ordering::Relaxed) {
            UNSET => None,
            bits => Some(f64::from_bits(bits)),
        }
    }
}

impl Default for LastPValue {
    fn default() -> Self {
        Self::new()
    }
}
