//! Priority frontier and visited set for best-first search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::domain::IataCode;

/// A queued node: index into the planner's node arena plus its priority.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub score: f64,
    pub cost: f64,
    seq: u64,
    pub node: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    /// Reversed so that `BinaryHeap` pops the lowest score first; ties go
    /// to the lower cost, then to the earlier insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.cost.total_cmp(&self.cost))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of arena nodes.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: usize, score: f64, cost: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            score,
            cost,
            seq,
            node,
        });
    }

    pub fn pop(&mut self) -> Option<Entry> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Dedup key: the same airport reached with a different stop count is a
/// different state, since it leaves a different stop allowance.
pub type VisitedKey = (IataCode, u32);

/// Cheapest known cost per (airport, stops).
#[derive(Debug, Default)]
pub struct VisitedSet {
    best: HashMap<VisitedKey, f64>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `cost` for `key` if it beats every earlier arrival.
    ///
    /// Returns false when an equal or cheaper arrival is already recorded.
    pub fn admit(&mut self, key: VisitedKey, cost: f64) -> bool {
        match self.best.get(&key) {
            Some(&best) if best <= cost => false,
            _ => {
                self.best.insert(key, cost);
                true
            }
        }
    }

    /// True if a cheaper arrival was admitted after this one was queued.
    pub fn is_stale(&self, key: &VisitedKey, cost: f64) -> bool {
        self.best.get(key).is_some_and(|&best| best < cost)
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }
}
