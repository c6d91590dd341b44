/// Performance measurement utilities
/// Render stages are timed through scoped timers and reported via `log`
use std::time::{Duration, Instant};

/// Scoped timer that logs its lifetime at debug level when dropped.
pub struct PerfTimer {
    name: &'static str,
    start: Instant,
    enabled: bool,
}

impl PerfTimer {
    /// Timer that only reports when `enabled` is set, e.g. from
    /// `RenderConfig::profile`.
    #[inline]
    pub fn when(name: &'static str, enabled: bool) -> Self {
        Self {
            name,
            start: Instant::now(),
            enabled,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        if self.enabled {
            log::debug!("[PERF] {}: {}μs", self.name, self.elapsed().as_micros());
        }
    }
}

/// Rolling frame-time accumulator for the viewer.
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub frames: u32,
    pub total: Duration,
    pub worst: Duration,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: Duration) {
        self.frames += 1;
        self.total += frame;
        self.worst = self.worst.max(frame);
    }

    pub fn average(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            self.total / self.frames
        }
    }

    /// Log the summary and start a new window.
    pub fn log_and_reset(&mut self) {
        if self.frames > 0 {
            let avg = self.average();
            log::info!(
                "{} frames, avg {:.2}ms ({:.0} fps), worst {:.2}ms",
                self.frames,
                avg.as_secs_f64() * 1e3,
                1.0 / avg.as_secs_f64().max(1e-9),
                self.worst.as_secs_f64() * 1e3
            );
        }
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_average_and_reset() {
        let mut stats = PerfStats::new();
        assert_eq!(stats.average(), Duration::ZERO);
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(30));
        assert_eq!(stats.average(), Duration::from_millis(20));
        assert_eq!(stats.worst, Duration::from_millis(30));
        stats.log_and_reset();
        assert_eq!(stats.frames, 0);
    }
}
