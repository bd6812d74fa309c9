use std::cmp::{Ordering, Reverse};

use priority_queue::PriorityQueue;

use crate::grid::Coord;

/// f-score with a total order so it can key the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score(f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Indexed min-priority frontier of cells keyed by f-score. Each coordinate appears at most once;
/// re-prioritising an entry is a direct decrease-key.
#[derive(Debug)]
pub struct OpenSet {
    // PriorityQueue pops the highest priority first, so scores are reversed
    queue: PriorityQueue<Coord, Reverse<Score>>,
}

impl OpenSet {
    pub fn new() -> Self {
        OpenSet {
            queue: PriorityQueue::new(),
        }
    }

    /// Adds `coord` with priority `f_score`. Returns false, leaving the set untouched, if it is
    /// already present.
    pub fn insert(&mut self, coord: Coord, f_score: f64) -> bool {
        if self.contains(coord) {
            return false;
        }
        self.queue.push(coord, Reverse(Score(f_score)));
        true
    }

    /// Re-prioritises an existing entry. Returns false if `coord` is not in the set.
    pub fn update(&mut self, coord: Coord, f_score: f64) -> bool {
        self.queue
            .change_priority(&coord, Reverse(Score(f_score)))
            .is_some()
    }

    /// Removes an arbitrary entry, returning its priority.
    pub fn remove(&mut self, coord: Coord) -> Option<f64> {
        self.queue
            .remove(&coord)
            .map(|(_, Reverse(Score(f_score)))| f_score)
    }

    /// Removes the entry with the smallest f-score. Ties come out in no particular order.
    pub fn pop_min(&mut self) -> Option<(Coord, f64)> {
        self.queue
            .pop()
            .map(|(coord, Reverse(Score(f_score)))| (coord, f_score))
    }

    pub fn peek_min(&self) -> Option<(Coord, f64)> {
        self.queue
            .peek()
            .map(|(&coord, &Reverse(Score(f_score)))| (coord, f_score))
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.queue.get_priority(&coord).is_some()
    }

    pub fn priority(&self, coord: Coord) -> Option<f64> {
        self.queue
            .get_priority(&coord)
            .map(|&Reverse(Score(f_score))| f_score)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for OpenSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_ascending_f_score() {
        let mut open = OpenSet::new();
        assert!(open.insert((0, 0), 3.0));
        assert!(open.insert((0, 1), 1.5));
        assert!(open.insert((0, 2), 2.0));
        assert_eq!(open.len(), 3);
        assert_eq!(open.peek_min(), Some(((0, 1), 1.5)));
        assert_eq!(open.pop_min(), Some(((0, 1), 1.5)));
        assert_eq!(open.pop_min(), Some(((0, 2), 2.0)));
        assert_eq!(open.pop_min(), Some(((0, 0), 3.0)));
        assert_eq!(open.pop_min(), None);
        assert!(open.is_empty());
    }

    #[test]
    fn test_entries_are_unique() {
        let mut open = OpenSet::new();
        assert!(open.insert((1, 1), 4.0));
        assert!(!open.insert((1, 1), 1.0));
        assert_eq!(open.len(), 1);
        assert_eq!(open.priority((1, 1)), Some(4.0));
    }

    #[test]
    fn test_decrease_key_and_remove() {
        let mut open = OpenSet::new();
        open.insert((0, 0), 5.0);
        open.insert((0, 1), 4.0);
        assert!(open.update((0, 0), 1.0));
        assert!(!open.update((9, 9), 1.0));
        assert_eq!(open.pop_min(), Some(((0, 0), 1.0)));

        assert_eq!(open.remove((0, 1)), Some(4.0));
        assert_eq!(open.remove((0, 1)), None);
        assert!(!open.contains((0, 1)));
        assert!(open.is_empty());
    }

    #[test]
    fn test_infinite_scores_sort_last() {
        let mut open = OpenSet::new();
        open.insert((0, 0), f64::INFINITY);
        open.insert((0, 1), 1e9);
        assert_eq!(open.pop_min(), Some(((0, 1), 1e9)));
    }
}
