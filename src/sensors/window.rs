//! Fixed-capacity sliding window with a strict validity rule.
//!
//! Backed by a `heapless::Deque` sized for [`MAX_WINDOW`]; the effective
//! capacity is chosen at construction and never changes.  The average is
//! reported **only** when the window holds exactly `capacity` samples, so
//! an emptied window has to re-accumulate fresh evidence before it can
//! drive a decision again.

use heapless::Deque;

/// Largest window the controller can be configured with.
pub const MAX_WINDOW: usize = 64;

#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    samples: Deque<i32, MAX_WINDOW>,
}

impl SlidingWindow {
    /// `capacity` must be in `1..=MAX_WINDOW` (enforced by config validation).
    pub fn new(capacity: usize) -> Self {
        debug_assert!(
            (1..=MAX_WINDOW).contains(&capacity),
            "invalid window capacity: {capacity}"
        );
        Self {
            capacity: capacity.clamp(1, MAX_WINDOW),
            samples: Deque::new(),
        }
    }

    /// Append a sample, evicting the oldest one once `capacity` is exceeded.
    pub fn push(&mut self, value: i32) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Cannot fail: len < capacity <= MAX_WINDOW after eviction.
        let _ = self.samples.push_back(value);
    }

    /// Arithmetic mean of the window, or `None` unless it is exactly full.
    pub fn average(&self) -> Option<f64> {
        if self.samples.len() != self.capacity {
            return None;
        }
        let sum: i64 = self.samples.iter().map(|&v| i64::from(v)).sum();
        Some(sum as f64 / self.capacity as f64)
    }

    /// Empty the window without touching its capacity.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples currently held, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().copied()
    }
}
