//! Bounded selection of the least-edited matches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Candidate<T> {
    distance: usize,
    /// Discovery order; breaks distance ties in favour of earlier matches.
    seq: u64,
    item: T,
}

impl<T> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Candidate<T> {}

impl<T> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.distance, self.seq).cmp(&(other.distance, other.seq))
    }
}

/// Keeps the `k` candidates with the smallest `(distance, seq)`.
///
/// The heap's peek is the worst kept candidate, so a newcomer only has to be
/// compared against it.
pub(crate) struct TopK<T> {
    k: usize,
    next_seq: u64,
    heap: BinaryHeap<Candidate<T>>,
}

impl<T> TopK<T> {
    pub(crate) fn new(k: usize) -> Self {
        debug_assert!(k > 0);
        Self {
            k,
            next_seq: 0,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Offers a match found at `distance`. `make` runs only if the candidate
    /// is kept; returns whether it was.
    pub(crate) fn offer(&mut self, distance: usize, make: impl FnOnce() -> T) -> bool {
        self.next_seq += 1;
        let seq = self.next_seq;

        if self.heap.len() < self.k {
            self.heap.push(Candidate {
                distance,
                seq,
                item: make(),
            });
            return true;
        }

        match self.heap.peek() {
            Some(worst) if distance < worst.distance => {
                self.heap.pop();
                self.heap.push(Candidate {
                    distance,
                    seq,
                    item: make(),
                });
                true
            }
            _ => false,
        }
    }

    /// Kept items, ascending by distance then discovery order.
    pub(crate) fn into_sorted_vec(self) -> Vec<T> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| candidate.item)
            .collect()
    }
}
