// History module - bounded RMS window
//
// Keeps the most recent RMS values in push order. Statistics are recomputed
// from the window contents on every call; at 100 elements that is cheap and
// avoids accumulated drift from incremental updates.

use std::collections::VecDeque;

/// Number of RMS samples the metallic/water-ink rule looks at.
pub const HISTORY_CAPACITY: usize = 100;

/// FIFO window of recent RMS values.
#[derive(Debug, Clone)]
pub struct FeatureHistory {
    values: VecDeque<f32>,
    capacity: usize,
}

impl FeatureHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest once over capacity.
    pub fn push(&mut self, rms: f32) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(rms);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the window holds `capacity` values; the classifier only
    /// reads statistics from a full window.
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Values oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Arithmetic mean, `None` on an empty window.
    pub fn average(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f32 = self.values.iter().sum();
        Some(sum / self.values.len() as f32)
    }

    /// Peak-to-trough spread (max - min), `None` on an empty window.
    pub fn fluctuation(&self) -> Option<f32> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(max - min)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for FeatureHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_hundred_in_push_order() {
        let mut history = FeatureHistory::default();
        for i in 0..150 {
            history.push(i as f32);
        }

        assert_eq!(history.len(), 100);
        let values: Vec<f32> = history.iter().collect();
        let expected: Vec<f32> = (50..150).map(|i| i as f32).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn empty_window_has_no_statistics() {
        let history = FeatureHistory::default();
        assert!(history.average().is_none());
        assert!(history.fluctuation().is_none());
        assert!(!history.is_full());
    }

    #[test]
    fn average_and_fluctuation_follow_window_contents() {
        let mut history = FeatureHistory::new(4);
        for v in [0.1, 0.3, 0.2, 0.4] {
            history.push(v);
        }
        assert!((history.average().unwrap() - 0.25).abs() < 1e-6);
        assert!((history.fluctuation().unwrap() - 0.3).abs() < 1e-6);

        // evicting 0.1 shrinks the spread
        history.push(0.35);
        assert!((history.fluctuation().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn is_full_only_at_capacity() {
        let mut history = FeatureHistory::default();
        for _ in 0..99 {
            history.push(0.01);
        }
        assert!(!history.is_full());
        history.push(0.01);
        assert!(history.is_full());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut history = FeatureHistory::new(0);
        history.push(1.0);
        history.push(2.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.capacity(), 1);
    }
}
