//! Frame timing for fixed-step scenario loops.
//!
//! A scenario frame is one `update` call. [`measure_frames`] times each one and [`FrameStats`]
//! summarizes them.

use std::fmt;
use std::time::{Duration, Instant};

/// Summary of a run of timed frames.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Every frame time, shortest first.
    sorted: Vec<Duration>,
    total: Duration,
}

impl FrameStats {
    /// Summarize frame times given in any order.
    pub fn from_times(mut times: Vec<Duration>) -> Self {
        times.sort_unstable();
        Self {
            total: times.iter().sum(),
            sorted: times,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.sorted.len()
    }

    /// Sum of every frame time.
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn min(&self) -> Duration {
        self.sorted.first().copied().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.sorted.last().copied().unwrap_or_default()
    }

    pub fn average(&self) -> Duration {
        match self.frame_count() {
            0 => Duration::ZERO,
            n => self.total / n as u32,
        }
    }

    /// Frame time at percentile `p`, clamped to 0..=100. Nearest rank, rounding down.
    pub fn percentile(&self, p: usize) -> Duration {
        let Some(last) = self.frame_count().checked_sub(1) else {
            return Duration::ZERO;
        };
        self.sorted[(self.frame_count() * p.min(100) / 100).min(last)]
    }

    pub fn median(&self) -> Duration {
        self.percentile(50)
    }

    pub fn p95(&self) -> Duration {
        self.percentile(95)
    }

    /// The frame time only the worst 1% of frames exceed.
    pub fn p99(&self) -> Duration {
        self.percentile(99)
    }

    /// Sample standard deviation. Zero for fewer than two frames.
    pub fn std_dev(&self) -> Duration {
        let n = self.frame_count();
        if n < 2 {
            return Duration::ZERO;
        }
        let mean = self.average().as_secs_f64();
        let sum_sq: f64 = self
            .sorted
            .iter()
            .map(|t| (t.as_secs_f64() - mean).powi(2))
            .sum();
        Duration::from_secs_f64((sum_sq / (n - 1) as f64).sqrt())
    }

    /// Frames per second at the average frame time.
    pub fn fps(&self) -> f64 {
        match self.average() {
            avg if avg.is_zero() => 0.0,
            avg => 1.0 / avg.as_secs_f64(),
        }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        write!(
            f,
            "{} frames, avg: {:.2}ms ({:.1} fps), p99: {:.2}ms, min: {:.2}ms, max: {:.2}ms",
            self.frame_count(),
            ms(self.average()),
            self.fps(),
            ms(self.p99()),
            ms(self.min()),
            ms(self.max()),
        )
    }
}

/// Call `frame_fn` with each frame number in `0..frame_count` and time every call.
pub fn measure_frames<F>(frame_count: usize, mut frame_fn: F) -> FrameStats
where
    F: FnMut(usize),
{
    let times = (0..frame_count)
        .map(|frame| {
            let start = Instant::now();
            frame_fn(frame);
            start.elapsed()
        })
        .collect();
    FrameStats::from_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn stats_of_known_times() {
        // Given
        let stats = FrameStats::from_times(vec![ms(10), ms(12), ms(11), ms(15), ms(10)]);

        // Then
        assert_eq!(stats.frame_count(), 5);
        assert_eq!(stats.total(), ms(58));
        assert_eq!(stats.min(), ms(10));
        assert_eq!(stats.max(), ms(15));
        assert_eq!(stats.median(), ms(11));
        assert_eq!(stats.p99(), ms(15));
        assert!(stats.average() > ms(11) && stats.average() < ms(12));
        assert!(stats.std_dev() > ms(1) && stats.std_dev() < ms(3));
    }

    #[test]
    fn measure_frames_passes_frame_numbers() {
        // Given
        let mut seen = Vec::new();

        // When
        let stats = measure_frames(5, |frame| seen.push(frame));

        // Then
        assert_eq!(stats.frame_count(), 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(stats.min() <= stats.median());
        assert!(stats.median() <= stats.max());
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = FrameStats::default();

        assert_eq!(stats.p99(), Duration::ZERO);
        assert_eq!(stats.std_dev(), Duration::ZERO);
        assert_eq!(stats.fps(), 0.0);
    }
}
