//! Pacing policies for sequential calls to the inference service.
//!
//! A throttle only decides how long to wait after the n-th call; the caller
//! does the sleeping. Calls are never issued in parallel.

use std::time::Duration;

use log::debug;

/// Delay policy applied after each classification call
pub trait Throttle: Send + Sync {
    /// Delay to wait after the call at `call_index` (0-based) completed
    fn delay_after(&self, call_index: usize) -> Duration;
}

/// No pause between calls
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Throttle for NoDelay {
    fn delay_after(&self, _call_index: usize) -> Duration {
        Duration::ZERO
    }
}

/// Constant pause between calls
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(millis: u64) -> Self {
        FixedDelay(Duration::from_millis(millis))
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        FixedDelay::from_millis(100)
    }
}

impl Throttle for FixedDelay {
    fn delay_after(&self, _call_index: usize) -> Duration {
        self.0
    }
}

/// Pause that grows by `step` per call, capped at `max`
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    pub step: Duration,
    pub max: Duration,
}

impl Throttle for LinearBackoff {
    fn delay_after(&self, call_index: usize) -> Duration {
        let factor = u32::try_from(call_index.saturating_add(1)).unwrap_or(u32::MAX);
        self.step.saturating_mul(factor).min(self.max)
    }
}

/// Sleep for whatever the throttle asks after `call_index`
pub async fn pause(throttle: &dyn Throttle, call_index: usize) {
    let delay = throttle.delay_after(call_index);
    if !delay.is_zero() {
        debug!("Throttling {:?} after call {}", delay, call_index + 1);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delay() {
        assert_eq!(NoDelay.delay_after(0), Duration::ZERO);
        assert_eq!(NoDelay.delay_after(99), Duration::ZERO);
    }

    #[test]
    fn test_fixed_delay() {
        let throttle = FixedDelay::default();
        assert_eq!(throttle.delay_after(0), Duration::from_millis(100));
        assert_eq!(throttle.delay_after(7), Duration::from_millis(100));
    }

    #[test]
    fn test_linear_backoff_is_capped() {
        let throttle = LinearBackoff {
            step: Duration::from_millis(50),
            max: Duration::from_millis(120),
        };
        assert_eq!(throttle.delay_after(0), Duration::from_millis(50));
        assert_eq!(throttle.delay_after(1), Duration::from_millis(100));
        assert_eq!(throttle.delay_after(2), Duration::from_millis(120));
        assert_eq!(throttle.delay_after(usize::MAX), Duration::from_millis(120));
    }

    #[test]
    fn test_pause_without_delay_returns_immediately() {
        tokio_test::block_on(pause(&NoDelay, 0));
    }
}
