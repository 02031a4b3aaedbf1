//! Bounded FIFO of the most recent samples, for trend display.

use std::collections::VecDeque;

use crate::sample::Sample;

/// Number of samples kept for display.
pub const WINDOW_CAPACITY: usize = 20;

/// Fixed-capacity sample buffer. Appending to a full window evicts the
/// oldest sample first.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    pub fn append(&mut self, sample: Sample) {
        if self.samples.len() == WINDOW_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Samples in insertion order, most recent last.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        WINDOW_CAPACITY
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(i: u64) -> Sample {
        Sample::new(i, i as f64, 0.0, 0.0)
    }

    #[test]
    fn test_empty_window() {
        let w = SampleWindow::new();
        assert!(w.is_empty());
        assert!(w.latest().is_none());
        assert!(w.snapshot().is_empty());
        assert_eq!(w.capacity(), 20);
    }

    #[test]
    fn test_append_below_capacity_keeps_all() {
        let mut w = SampleWindow::new();
        for i in 0..5 {
            w.append(numbered(i));
        }
        let ts: Vec<u64> = w.snapshot().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, vec![0, 1, 2, 3, 4]);
        assert_eq!(w.latest().unwrap().timestamp_ms, 4);
    }

    #[test]
    fn test_25_appends_keep_last_20_in_order() {
        let mut w = SampleWindow::new();
        for i in 0..25 {
            w.append(numbered(i));
            assert!(w.len() <= WINDOW_CAPACITY);
        }
        let ts: Vec<u64> = w.snapshot().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, (5..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear() {
        let mut w = SampleWindow::new();
        w.append(numbered(1));
        w.clear();
        assert!(w.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut w = SampleWindow::new();
        w.append(numbered(1));
        let snap = w.snapshot();
        w.append(numbered(2));
        assert_eq!(snap.len(), 1);
    }
}
