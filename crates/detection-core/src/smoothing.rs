//! Temporal smoothing of the proximity signal.
//!
//! A fixed-capacity FIFO of the last N raw values; the smoothed value is
//! their arithmetic mean. Partial windows are valid, so the first frames
//! after a (re)start average over however many samples exist.

use std::collections::VecDeque;

/// Moving-average smoother over the last `window` samples.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: usize,
    buffer: VecDeque<f64>,
}

impl TemporalSmoother {
    /// Create a smoother. A window of 0 is treated as 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
        }
    }

    /// Push a raw sample, evicting the oldest if full, and return the new mean.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
        self.mean().unwrap_or(value)
    }

    /// Mean of the buffered samples, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.buffer.iter().sum::<f64>() / self.buffer.len() as f64)
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Buffered samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.buffer.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn partial_window_averages_available_samples() {
        let mut smoother = TemporalSmoother::new(5);
        assert_eq!(smoother.push(0.4), 0.4);
        assert!((smoother.push(0.2) - 0.3).abs() < 1e-12);
        assert!((smoother.push(0.3) - 0.3).abs() < 1e-12);
        assert_eq!(smoother.len(), 3);
    }

    #[test]
    fn full_window_evicts_oldest_first() {
        let mut smoother = TemporalSmoother::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            smoother.push(v);
        }
        assert_eq!(smoother.len(), 3);
        assert_eq!(smoother.samples().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert!((smoother.mean().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn clear_restarts_from_empty_window() {
        let mut smoother = TemporalSmoother::new(3);
        smoother.push(999.0);
        smoother.push(999.0);
        smoother.clear();
        assert!(smoother.is_empty());
        assert_eq!(smoother.mean(), None);
        assert_eq!(smoother.push(0.1), 0.1);
    }

    #[test]
    fn zero_window_behaves_as_one() {
        let mut smoother = TemporalSmoother::new(0);
        smoother.push(1.0);
        assert_eq!(smoother.push(2.0), 2.0);
        assert_eq!(smoother.window(), 1);
    }

    proptest! {
        #[test]
        fn smoothed_value_is_mean_of_last_k(
            values in proptest::collection::vec(0.0f64..1000.0, 1..40),
            window in 1usize..10,
        ) {
            let mut smoother = TemporalSmoother::new(window);
            for (k, value) in values.iter().enumerate() {
                let smoothed = smoother.push(*value);
                let n = (k + 1).min(window);
                let tail = &values[k + 1 - n..=k];
                let expected = tail.iter().sum::<f64>() / n as f64;
                prop_assert!((smoothed - expected).abs() < 1e-9);
                prop_assert!(smoother.len() <= window);
            }
        }
    }
}
