//! Reconnect backoff policy.

use std::time::Duration;

/// Exponential backoff state for one channel.
///
/// Attempt N (1-based) waits `base_delay * 2^N`, so with the default one
/// second base the ladder is 2s, 4s, 8s, 16s, 32s. The counter resets when a
/// connection opens successfully.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_delay,
        }
    }

    /// Reconnect attempts used since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Consume one attempt and return the delay to wait before it.
    ///
    /// Returns `None` once the budget is spent.
    pub fn next_delay_and_advance(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts += 1;
        let factor = 2u32.saturating_pow(self.attempts);
        Some(self.base_delay.saturating_mul(factor))
    }

    /// Restore the full attempt budget.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_ladder() {
        let mut policy = RetryPolicy::new(5, Duration::from_secs(1));
        let mut delays = Vec::new();
        while let Some(delay) = policy.next_delay_and_advance() {
            delays.push(delay.as_secs());
        }
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
        assert!(policy.is_exhausted());
        assert_eq!(policy.next_delay_and_advance(), None);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut policy = RetryPolicy::new(5, Duration::from_secs(1));
        policy.next_delay_and_advance();
        policy.next_delay_and_advance();
        assert_eq!(policy.attempts(), 2);

        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(
            policy.next_delay_and_advance(),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_base_delay_scales_ladder() {
        let mut policy = RetryPolicy::new(2, Duration::from_millis(100));
        assert_eq!(
            policy.next_delay_and_advance(),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.next_delay_and_advance(),
            Some(Duration::from_millis(400))
        );
        assert_eq!(policy.next_delay_and_advance(), None);
    }

    #[test]
    fn test_zero_budget_gives_up_immediately() {
        let mut policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert!(policy.is_exhausted());
        assert_eq!(policy.next_delay_and_advance(), None);
    }
}
