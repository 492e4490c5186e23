use rand::Rng;
use std::time::Duration;

/// Bounded retry policy with exponential backoff.
///
/// Components that talk to the network each own one of these instead of
/// hardcoding sleeps: the RPC client, the polling loop's per-signature
/// lookup, and the pipeline's asset-source retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Ceiling for the backoff growth
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Deterministic backoff for a 0-based attempt index: base * 2^attempt, capped.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.base_delay.saturating_mul(factor);
        delay.min(self.max_delay)
    }

    /// Backoff with up to 25% random jitter added, to spread retry bursts.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff_delay(attempt);
        let jitter_ms = delay.as_millis() as u64 / 4;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// True while more attempts remain after `attempt` (0-based)
    pub fn has_more_attempts(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500), Duration::from_secs(60));
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(4000));
    }

    #[test]
    fn backoff_respects_cap() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(6), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(30), Duration::from_secs(4));
    }

    #[test]
    fn jittered_delay_stays_bounded() {
        let policy = RetryPolicy::default();
        for attempt in 0..4 {
            let base = policy.backoff_delay(attempt);
            let jittered = policy.delay_for(attempt);
            assert!(jittered >= base);
            assert!(jittered <= base + base / 4);
        }
    }

    #[test]
    fn attempt_budget_is_enforced() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10));
        assert!(policy.has_more_attempts(0));
        assert!(policy.has_more_attempts(1));
        assert!(!policy.has_more_attempts(2));
    }
}
