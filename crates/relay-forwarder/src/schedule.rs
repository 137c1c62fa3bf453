//! Fixed retry schedule.

use std::time::Duration;

/// Attempt budget and the pause taken after each attempt.
///
/// One attempt is made per entry in `delays`; the matching delay is waited
/// after a failed attempt, including the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
    attempt_timeout: Duration,
}

impl RetrySchedule {
    /// Creates a schedule with one attempt per delay.
    #[must_use]
    pub fn new(delays: Vec<Duration>, attempt_timeout: Duration) -> Self {
        Self {
            delays,
            attempt_timeout,
        }
    }

    /// Number of attempts made before giving up.
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.delays.len()
    }

    /// Pauses taken after attempts 1..=N.
    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Upper bound on a single attempt, connect through response.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Longest time a fully failing relay can take.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let attempts = u32::try_from(self.delays.len()).unwrap_or(u32::MAX);
        self.attempt_timeout * attempts + self.delays.iter().sum::<Duration>()
    }
}

impl Default for RetrySchedule {
    /// 3 attempts, 200ms / 500ms / 1s pauses, 5s per attempt.
    fn default() -> Self {
        Self::new(
            vec![
                Duration::from_millis(200),
                Duration::from_millis(500),
                Duration::from_millis(1000),
            ],
            Duration::from_secs(5),
        )
    }
}
