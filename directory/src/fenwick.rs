//! Fenwick (binary indexed) tree over `u128` weights.
//!
//! Supports append, in-place weight changes and prefix sums in `O(log n)`,
//! and locating the entry whose cumulative range contains a target weight
//! by binary lifting, also `O(log n)`.
//!
//! Callers must keep the total within `u128`; every partial sum is then in
//! range too, so the tree itself never overflows.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTree {
    weights: Vec<u128>,
    /// `sums[i - 1]` covers weights `(i - lowbit(i), i]`, 1-based.
    sums: Vec<u128>,
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

impl WeightTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, index: usize) -> Option<u128> {
        self.weights.get(index).copied()
    }

    pub fn weights(&self) -> &[u128] {
        &self.weights
    }

    /// Append a weight and return its index.
    pub fn push(&mut self, weight: u128) -> usize {
        self.weights.push(weight);
        let i = self.weights.len();
        let mut sum = weight;
        let mut step = 1;
        while step < lowbit(i) {
            sum = sum.wrapping_add(self.sums[i - step - 1]);
            step <<= 1;
        }
        self.sums.push(sum);
        i - 1
    }

    /// Replace the weight at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, weight: u128) {
        let Some(old) = self.weights.get(index).copied() else {
            return;
        };
        self.weights[index] = weight;
        let grow = weight >= old;
        let delta = if grow { weight - old } else { old - weight };
        let mut i = index + 1;
        while i <= self.sums.len() {
            let slot = &mut self.sums[i - 1];
            *slot = if grow {
                slot.wrapping_add(delta)
            } else {
                slot.wrapping_sub(delta)
            };
            i += lowbit(i);
        }
    }

    /// Sum of the first `count` weights.
    pub fn prefix(&self, count: usize) -> u128 {
        let mut i = count.min(self.sums.len());
        let mut sum = 0u128;
        while i > 0 {
            sum = sum.wrapping_add(self.sums[i - 1]);
            i -= lowbit(i);
        }
        sum
    }

    pub fn total(&self) -> u128 {
        self.prefix(self.len())
    }

    /// Index `i` with `prefix(i) <= target < prefix(i + 1)`, or `None` when
    /// `target` is not below the total.
    pub fn find(&self, target: u128) -> Option<usize> {
        if target >= self.total() {
            return None;
        }
        let n = self.sums.len();
        let mut pos = 0usize;
        let mut rem = target;
        let mut step = if n == 0 { 0 } else { 1usize << (usize::BITS - 1 - n.leading_zeros()) };
        while step > 0 {
            let next = pos + step;
            if next <= n && self.sums[next - 1] <= rem {
                pos = next;
                rem -= self.sums[next - 1];
            }
            step >>= 1;
        }
        Some(pos)
    }
}
