//! Bounded reconnect schedule.

use std::time::Duration;

use crate::infrastructure::config::stream::ReconnectConfig;

/// Counts consecutive connection failures and picks the delay before the
/// next attempt from a fixed table, indexed by the incremented counter.
/// The first retry waits `backoff_ms[1]`; a one-entry table always uses entry 0.
///
/// The counter is reset only after a connection has authenticated and
/// replayed its subscriptions.
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectSchedule {
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Record a failure and return the delay before the next attempt, or
    /// `None` once `max_attempts` failures have accumulated.
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts >= self.config.max_attempts {
            return None;
        }
        let index = (self.attempts as usize).min(self.config.backoff_ms.len().saturating_sub(1));
        let delay_ms = self.config.backoff_ms.get(index).copied().unwrap_or(0);
        Some(Duration::from_millis(delay_ms))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(max_attempts: u32, backoff_ms: Vec<u64>) -> ReconnectSchedule {
        ReconnectSchedule::new(ReconnectConfig {
            max_attempts,
            backoff_ms,
        })
    }

    #[test]
    fn default_schedule_allows_four_retries() {
        let mut schedule = ReconnectSchedule::new(ReconnectConfig::default());
        let delays: Vec<_> = std::iter::from_fn(|| schedule.record_failure()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(3),
                Duration::from_secs(10),
                Duration::from_secs(30),
                Duration::from_secs(60),
            ]
        );
        assert_eq!(schedule.attempts(), 5);
    }

    #[test]
    fn short_table_repeats_last_delay() {
        let mut schedule = schedule(4, vec![1, 2]);
        assert_eq!(schedule.record_failure(), Some(Duration::from_millis(2)));
        assert_eq!(schedule.record_failure(), Some(Duration::from_millis(2)));
        assert_eq!(schedule.record_failure(), Some(Duration::from_millis(2)));
        assert_eq!(schedule.record_failure(), None);
    }

    #[test]
    fn reset_restarts_the_table() {
        let mut schedule = schedule(3, vec![5, 50]);
        schedule.record_failure();
        schedule.record_failure();
        schedule.reset();
        assert_eq!(schedule.attempts(), 0);
        assert_eq!(schedule.record_failure(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn first_retry_skips_the_leading_entry() {
        let mut schedule = ReconnectSchedule::new(ReconnectConfig::default());
        assert_eq!(schedule.record_failure(), Some(Duration::from_secs(3)));
        assert_eq!(schedule.attempts(), 1);
    }

    #[test]
    fn single_attempt_never_retries() {
        let mut schedule = schedule(1, vec![5]);
        assert_eq!(schedule.record_failure(), None);
        assert_eq!(schedule.max_attempts(), 1);
    }
}
