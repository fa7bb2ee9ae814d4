//! Inter-request delay for sequential batches
//!
//! Items are crawled one at a time. Before every item except the first,
//! the limiter sleeps for the full configured delay, so a batch of `n`
//! URLs waits at least `(n - 1) * delay` in total.

use crate::clock::Clock;
use chrono::NaiveDateTime;
use std::time::Duration;

/// Spaces out consecutive requests by a fixed delay
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Pause inserted between two consecutive items
    delay: Duration,

    /// When the previous item was started
    last_request: Option<NaiveDateTime>,
}

impl RateLimiter {
    /// Creates a limiter that has not seen any request yet
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Waits until the next item may start, then records its start time
    pub async fn wait_turn(&mut self, clock: &dyn Clock) {
        if let Some(previous) = self.last_request {
            if !self.delay.is_zero() {
                tracing::debug!(
                    "Waiting {:?} before next request (previous started {})",
                    self.delay,
                    previous
                );
                clock.sleep(self.delay).await;
            }
        }
        self.last_request = Some(clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::NaiveDate;

    fn clock() -> ManualClock {
        ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_first_turn_does_not_wait() {
        let clock = clock();
        let mut limiter = RateLimiter::new(Duration::from_secs(2));

        limiter.wait_turn(&clock).await;

        assert!(clock.sleeps().is_empty());
        assert_eq!(limiter.last_request, Some(clock.now()));
    }

    #[tokio::test]
    async fn test_subsequent_turns_wait_full_delay() {
        let clock = clock();
        let mut limiter = RateLimiter::new(Duration::from_secs(2));

        for _ in 0..4 {
            limiter.wait_turn(&clock).await;
        }

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 3]);
        assert_eq!(clock.total_slept(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_zero_delay_never_sleeps() {
        let clock = clock();
        let mut limiter = RateLimiter::new(Duration::ZERO);

        limiter.wait_turn(&clock).await;
        limiter.wait_turn(&clock).await;

        assert!(clock.sleeps().is_empty());
    }
}
