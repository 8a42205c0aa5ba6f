use crate::graph::{Node, NodeId};

/// Decomposable score over a fixed list of variables. Higher is better.
pub trait Score: Send + Sync {
    fn variables(&self) -> &[Node];

    /// Score of `node` with exactly `parents` as its parent set.
    fn local_score(&self, node: NodeId, parents: &[NodeId]) -> f64;

    /// Gain from adding `x` as a parent of `y` whose parents are `z`.
    fn local_score_diff(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> f64 {
        let mut with_x = Vec::with_capacity(z.len() + 1);
        with_x.extend_from_slice(z);
        with_x.push(x);
        self.local_score(y, &with_x) - self.local_score(y, z)
    }

    fn sample_size(&self) -> usize;

    fn name(&self) -> &str;
}
