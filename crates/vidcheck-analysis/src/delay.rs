//! Delay providers for simulated latency.
//!
//! Stage pacing and the mock scorer never call `tokio::time::sleep` directly;
//! they go through a [`DelayProvider`] so tests can substitute a fixed or
//! virtual delay without touching orchestration logic.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Inclusive bounds for a randomly drawn delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayBounds {
    pub min: Duration,
    pub max: Duration,
}

impl DelayBounds {
    /// Bounds from milliseconds. Swapped arguments are reordered.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms.min(max_ms)),
            max: Duration::from_millis(min_ms.max(max_ms)),
        }
    }

    /// Per-stage pacing used by the orchestrator (800-1200 ms).
    pub fn stage_default() -> Self {
        Self::from_millis(800, 1200)
    }

    /// Simulated analysis time of the mock scorer (2000-4000 ms).
    pub fn analysis_default() -> Self {
        Self::from_millis(2000, 4000)
    }

    pub fn contains(&self, duration: Duration) -> bool {
        duration >= self.min && duration <= self.max
    }

    /// Draw a duration uniformly from the bounds.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.min, self.max)
    }
}

/// Source of (possibly simulated) waiting.
#[async_trait]
pub trait DelayProvider: Send + Sync {
    /// Wait for a duration chosen within `bounds` and return how long was
    /// waited (or reported as waited).
    async fn delay(&self, bounds: DelayBounds) -> Duration;
}

/// Sleeps for a uniformly random duration within the bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDelay;

#[async_trait]
impl DelayProvider for RandomDelay {
    async fn delay(&self, bounds: DelayBounds) -> Duration {
        let duration = bounds.sample();
        tokio::time::sleep(duration).await;
        duration
    }
}

/// Sleeps for a fixed duration regardless of the bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    /// No waiting at all.
    pub fn zero() -> Self {
        Self(Duration::ZERO)
    }
}

#[async_trait]
impl DelayProvider for FixedDelay {
    async fn delay(&self, _bounds: DelayBounds) -> Duration {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
        self.0
    }
}

/// Draws a duration within the bounds and reports it without sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualDelay;

#[async_trait]
impl DelayProvider for VirtualDelay {
    async fn delay(&self, bounds: DelayBounds) -> Duration {
        bounds.sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_reorder() {
        let bounds = DelayBounds::from_millis(500, 100);
        assert_eq!(bounds.min, Duration::from_millis(100));
        assert_eq!(bounds.max, Duration::from_millis(500));
    }

    #[test]
    fn test_sample_within_bounds() {
        let bounds = DelayBounds::analysis_default();
        for _ in 0..200 {
            assert!(bounds.contains(bounds.sample()));
        }
    }

    #[test]
    fn test_degenerate_bounds() {
        let bounds = DelayBounds::from_millis(250, 250);
        assert_eq!(bounds.sample(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_delay_sleeps() {
        let start = tokio::time::Instant::now();
        let waited = RandomDelay.delay(DelayBounds::stage_default()).await;
        assert!(DelayBounds::stage_default().contains(waited));
        assert!(start.elapsed() >= waited);
    }

    #[tokio::test]
    async fn test_virtual_delay_reports_without_sleeping() {
        let start = std::time::Instant::now();
        let reported = VirtualDelay.delay(DelayBounds::analysis_default()).await;
        assert!(reported >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_fixed_zero_delay() {
        let waited = tokio_test::block_on(FixedDelay::zero().delay(DelayBounds::analysis_default()));
        assert_eq!(waited, Duration::ZERO);
    }
}
