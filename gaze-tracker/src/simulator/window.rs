use gaze_core::Position;
use std::collections::VecDeque;

/// Fixed-size FIFO of recent samples used to decide whether gaze has settled.
///
/// Every push once the window is full evaluates stability and then evicts the
/// oldest sample, so consecutive checks overlap by `capacity - 1` samples.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    xs: VecDeque<f64>,
    ys: VecDeque<f64>,
    capacity: usize,
    max_spread: f64,
}

impl StabilityWindow {
    pub fn new(capacity: usize, max_spread: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            xs: VecDeque::with_capacity(capacity),
            ys: VecDeque::with_capacity(capacity),
            capacity,
            max_spread,
        }
    }

    /// Adds a sample. Returns it back when it completes a window whose spread
    /// is below `max_spread` on both axes.
    pub fn push(&mut self, sample: Position) -> Option<Position> {
        self.xs.push_back(sample.x);
        self.ys.push_back(sample.y);
        if self.xs.len() < self.capacity {
            return None;
        }
        let stable = spread(&self.xs) < self.max_spread && spread(&self.ys) < self.max_spread;
        self.xs.pop_front();
        self.ys.pop_front();
        stable.then_some(sample)
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }
}

fn spread(values: &VecDeque<f64>) -> f64 {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn needs_a_full_window() {
        let mut w = StabilityWindow::new(5, 3.0);
        for _ in 0..4 {
            assert_eq!(w.push(p(1.0, 1.0)), None);
        }
        assert_eq!(w.push(p(1.0, 1.0)), Some(p(1.0, 1.0)));
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn spread_of_exactly_threshold_is_not_stable() {
        let mut w = StabilityWindow::new(5, 3.0);
        for x in [0.0, 1.0, 2.0, 3.0] {
            assert_eq!(w.push(p(x, 0.0)), None);
        }
        // x spread is 3.0 here
        assert_eq!(w.push(p(1.5, 0.0)), None);
    }

    #[test]
    fn spread_just_below_threshold_is_stable() {
        let mut w = StabilityWindow::new(5, 3.0);
        for x in [0.0, 1.0, 2.0, 2.99] {
            assert_eq!(w.push(p(x, 0.0)), None);
        }
        assert_eq!(w.push(p(1.0, 0.0)), Some(p(1.0, 0.0)));
    }

    #[test]
    fn both_axes_must_settle() {
        let mut w = StabilityWindow::new(5, 3.0);
        for y in [0.0, 0.0, 0.0, 0.0] {
            w.push(p(0.0, y));
        }
        assert_eq!(w.push(p(0.0, 4.0)), None);
    }

    #[test]
    fn oldest_sample_is_evicted() {
        let mut w = StabilityWindow::new(5, 3.0);
        // the outlier leaves the window after four more samples
        w.push(p(50.0, 50.0));
        for _ in 0..4 {
            assert_eq!(w.push(p(0.0, 0.0)), None);
        }
        assert_eq!(w.push(p(0.0, 0.0)), Some(p(0.0, 0.0)));
    }
}
