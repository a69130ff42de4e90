use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock and sleep service used by tracker drivers and experiment items.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);

    fn sleep_ms(&self, ms: u64) {
        self.sleep(Duration::from_millis(ms))
    }
}

/// Monotonic nanosecond clock anchored at construction.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // Relative sleep; EINTR just shortens the wait, which polling callers tolerate.
        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic clock: time only moves when someone sleeps or calls `advance`.
///
/// Clones share the same clock, so a test can keep a handle while a driver owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ns: u64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(ns)),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Total time spent in `sleep` plus explicit advances.
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Bounded history of frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimes {
    samples: VecDeque<Duration>,
    max_samples: usize,
}

impl FrameTimes {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, d: Duration) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(d);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn summary(&self) -> FrameSummary {
        let times: Vec<f64> = self.samples.iter().map(|d| d.as_nanos() as f64).collect();
        if times.is_empty() {
            return FrameSummary {
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                min_frame_time_ns: 0.0,
                max_frame_time_ns: 0.0,
                effective_fps: 0.0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        FrameSummary {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameTimes {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_moves_only_on_sleep() {
        let timer = ManualTimer::new();
        let handle = timer.clone();
        assert_eq!(timer.now(), 0);
        timer.sleep(Duration::from_millis(10));
        assert_eq!(handle.now(), 10_000_000);
        let t = handle.now();
        handle.advance(Duration::from_micros(5));
        assert_eq!(timer.elapsed(t), Duration::from_micros(5));
        assert_eq!(timer.total(), Duration::from_nanos(10_005_000));
    }

    #[test]
    fn high_precision_timer_is_monotonic() {
        let timer = HighPrecisionTimer::new();
        let a = timer.now();
        timer.sleep(Duration::from_millis(2));
        let b = timer.now();
        assert!(b >= a + 1_000_000);
        assert!(timer.elapsed(a) >= Duration::from_millis(2));
    }

    #[test]
    fn frame_times_are_bounded() {
        let mut frames = FrameTimes::new(3);
        for ms in [10, 20, 30, 40] {
            frames.record(Duration::from_millis(ms));
        }
        assert_eq!(frames.len(), 3);
        let summary = frames.summary();
        assert_eq!(summary.min_frame_time_ns, 20_000_000.0);
        assert_eq!(summary.max_frame_time_ns, 40_000_000.0);
        assert_eq!(summary.average_frame_time_ns, 30_000_000.0);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = FrameTimes::default().summary();
        assert_eq!(summary.effective_fps, 0.0);
        assert_eq!(summary.jitter_ns, 0.0);
    }
}
