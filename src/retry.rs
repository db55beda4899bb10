//! Reconnect backoff policy.

use std::time::Duration;

/// Consecutive-failure counter driving exponential reconnect delays.
///
/// The n-th failure yields `base × 2^(n-1)`; after `max_retries` failures no
/// further delay is issued. Deliberately no jitter and no ceiling beyond the
/// retry count itself.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryState {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            base_delay,
        }
    }

    /// Record a failure. Returns the delay to wait before reconnecting, or
    /// `None` once retries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        let delay = self.base_delay * 2u32.saturating_pow(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    /// Failures recorded since the last successful connection.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Successful connection: restart the counter.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry_state() -> RetryState {
        RetryState::new(5, Duration::from_millis(3000))
    }

    #[test]
    fn delays_double_from_base_until_exhaustion() {
        let mut retries = retry_state();
        let observed: Vec<u64> = std::iter::from_fn(|| retries.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(observed, vec![3000, 6000, 12000, 24000, 48000]);
    }

    #[test]
    fn exhausted_state_stays_exhausted() {
        let mut retries = retry_state();
        while retries.next_delay().is_some() {}
        assert_eq!(retries.next_delay(), None);
        assert_eq!(retries.next_delay(), None);
        assert_eq!(retries.attempt(), 5);
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let mut retries = retry_state();
        retries.next_delay();
        retries.next_delay();
        retries.reset();
        assert_eq!(retries.attempt(), 0);
        assert_eq!(retries.next_delay(), Some(Duration::from_millis(3000)));
    }
}
