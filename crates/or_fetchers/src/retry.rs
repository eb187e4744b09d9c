use chrono::{DateTime, Utc};
use std::time::Duration;

/// Exponential backoff with an attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt`: `base_delay * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Longest single sleep: the backoff before the final attempt.
    pub fn max_delay(&self) -> Duration {
        self.backoff(self.max_attempts.saturating_sub(1))
    }

    /// A server-supplied delay wins over the computed backoff, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) => delay.min(self.max_delay()),
            None => self.backoff(attempt),
        }
    }

    /// Upper bound of total sleeping across all attempts when no server delay is given.
    pub fn worst_case_wait(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.backoff(attempt))
            .sum()
    }
}

/// Parses a `Retry-After` header: either delta-seconds or an HTTP date.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(seconds).ok();
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(2));
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(7), Duration::from_secs(256));
    }

    #[test]
    fn test_retry_after_overrides_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(5, Some(Duration::from_secs(1))), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(8));
    }

    #[test]
    fn test_server_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_delay(), Duration::from_secs(256));
        assert_eq!(policy.delay_for(0, parse_retry_after("86400")), Duration::from_secs(256));
        assert_eq!(policy.delay_for(0, parse_retry_after("3")), Duration::from_secs(3));

        let short = RetryPolicy { max_attempts: 2, base_delay: Duration::from_millis(10) };
        assert_eq!(short.delay_for(0, Some(Duration::from_secs(60))), Duration::from_millis(20));
    }

    #[test]
    fn test_worst_case_is_bounded() {
        let policy = RetryPolicy::default();
        assert!(policy.worst_case_wait() <= Duration::from_secs(256));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("1"), Some(Duration::from_secs(1)));
        assert_eq!(parse_retry_after(" 2.5 "), Some(Duration::from_millis(2500)));
        assert_eq!(parse_retry_after("-3"), None);
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("99999999999999999999999"), None);
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );
    }
}
