//! Runtime-agnostic reconnect policy and backoff math for the socket client.

use std::time::Duration;

use super::shared::{
    BACKOFF_MULTIPLIER, INITIAL_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS,
};

/// How the client behaves after losing its connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: MAX_RETRY_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(MAX_RETRY_DELAY_MS),
            multiplier: BACKOFF_MULTIPLIER,
        }
    }
}

impl ReconnectPolicy {
    /// Never retry: one connection attempt, then `Failed`/`Disconnected`.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

/// Exponential backoff state for one run of reconnect attempts.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    policy: ReconnectPolicy,
    attempts: u32,
    delay: Duration,
}

impl BackoffState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            delay: policy.initial_delay,
        }
    }

    /// Start over after a connection was established.
    pub fn reset(&mut self) {
        *self = Self::new(self.policy);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        !self.policy.enabled || self.attempts >= self.policy.max_attempts
    }

    /// Advance to the next attempt.
    ///
    /// Returns the delay to wait *before* that attempt, or `None` once the
    /// policy gives up.
    pub fn next_delay_and_advance(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let current = self.delay;
        self.attempts += 1;
        self.delay = current
            .mul_f64(self.policy.multiplier)
            .min(self.policy.max_delay);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = ReconnectPolicy {
            max_attempts: 7,
            ..ReconnectPolicy::default()
        };
        let mut backoff = BackoffState::new(policy);

        let delays: Vec<u128> = std::iter::from_fn(|| backoff.next_delay_and_advance())
            .map(|d| d.as_millis())
            .collect();

        assert_eq!(
            delays,
            vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]
        );
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.attempts(), 7);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut backoff = BackoffState::new(ReconnectPolicy::default());
        backoff.next_delay_and_advance();
        backoff.next_delay_and_advance();

        backoff.reset();

        assert_eq!(backoff.attempts(), 0);
        assert_eq!(
            backoff.next_delay_and_advance(),
            Some(Duration::from_millis(INITIAL_RETRY_DELAY_MS))
        );
    }

    #[test]
    fn test_disabled_policy_never_retries() {
        let mut backoff = BackoffState::new(ReconnectPolicy::disabled());
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.next_delay_and_advance(), None);
    }
}
