//! Lexicographic k-subsets of a node list.

use causa_core::NodeId;

/// Iterates every size-`k` subset of `pool`, preserving `pool`'s order inside
/// each subset. Subsets come out in lexicographic order of their positions.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    pool: &'a [NodeId],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(pool: &'a [NodeId], k: usize) -> Self {
        Self {
            pool,
            indices: (0..k).collect(),
            done: k > pool.len(),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.pool[i]).collect();

        // Advance: bump the rightmost index that still has room.
        let k = self.indices.len();
        let n = self.pool.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < n - k + i {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

/// Every subset of `pool` with size in `0..=max_size`, smallest first.
pub fn subsets_up_to(pool: &[NodeId], max_size: usize) -> impl Iterator<Item = Vec<NodeId>> + '_ {
    (0..=max_size.min(pool.len())).flat_map(move |k| Combinations::new(pool, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_choose_two() {
        let pool = [4, 7, 9];
        let all: Vec<_> = Combinations::new(&pool, 2).collect();
        assert_eq!(all, vec![vec![4, 7], vec![4, 9], vec![7, 9]]);
    }

    #[test]
    fn empty_subset_is_yielded_once() {
        let pool = [1, 2];
        let all: Vec<_> = Combinations::new(&pool, 0).collect();
        assert_eq!(all, vec![Vec::<NodeId>::new()]);
        let none: Vec<_> = Combinations::new(&[], 0).collect();
        assert_eq!(none.len(), 1);
    }

    #[test]
    fn oversized_subset_yields_nothing() {
        assert_eq!(Combinations::new(&[1, 2], 3).count(), 0);
    }

    #[test]
    fn counts_match_binomials() {
        let pool: Vec<NodeId> = (0..6).collect();
        let counts: Vec<usize> = (0..=6).map(|k| Combinations::new(&pool, k).count()).collect();
        assert_eq!(counts, vec![1, 6, 15, 20, 15, 6, 1]);
        assert_eq!(subsets_up_to(&pool, 2).count(), 1 + 6 + 15);
    }
}
