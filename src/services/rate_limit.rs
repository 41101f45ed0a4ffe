use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub retry_after_secs: u64,
}

/// Per-learner rolling window rate limiter.
///
/// Gates every matching request, cache hits included, so total endpoint
/// traffic stays bounded. The check and the increment happen under one lock
/// so concurrent requests for the same learner cannot exceed the limit.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check and record one invocation for a learner.
    ///
    /// When the limit is exceeded, `retry_after_secs` reports the remaining
    /// time until the oldest counted request ages out of the window.
    pub fn allow(&self, learner_id: &str) -> RateDecision {
        self.allow_at(learner_id, Instant::now())
    }

    fn allow_at(&self, learner_id: &str, now: Instant) -> RateDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entries = windows.entry(learner_id.to_string()).or_default();
        entries.retain(|t| now.duration_since(*t) < self.window);

        if entries.len() >= self.max_requests {
            // Entries are in arrival order, so the first is the oldest
            let oldest = entries.first().copied().unwrap_or(now);
            let remaining = self.window.saturating_sub(now.duration_since(oldest));
            return RateDecision {
                allowed: false,
                retry_after_secs: remaining.as_secs().max(1),
            };
        }

        entries.push(now);
        RateDecision {
            allowed: true,
            retry_after_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(5, 300);
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.allow_at("learner-1", now).allowed);
        }
    }

    #[test]
    fn test_sixth_call_rejected_with_retry_after() {
        let limiter = RateLimiter::new(5, 300);
        let start = Instant::now();

        for i in 0..5 {
            let at = start + Duration::from_secs(i * 10);
            assert!(limiter.allow_at("learner-1", at).allowed);
        }

        let decision = limiter.allow_at("learner-1", start + Duration::from_secs(60));
        assert!(!decision.allowed);
        // Oldest request ages out 300s after `start`, 240s from the check
        assert_eq!(decision.retry_after_secs, 240);
    }

    #[test]
    fn test_rejected_call_does_not_consume_quota() {
        let limiter = RateLimiter::new(2, 300);
        let now = Instant::now();

        assert!(limiter.allow_at("learner-1", now).allowed);
        assert!(limiter.allow_at("learner-1", now).allowed);
        assert!(!limiter.allow_at("learner-1", now).allowed);

        // The window still holds exactly two counted requests; once they
        // age out a new request is accepted again
        let later = now + Duration::from_secs(301);
        assert!(limiter.allow_at("learner-1", later).allowed);
    }

    #[test]
    fn test_window_elapse_resets_quota() {
        let limiter = RateLimiter::new(5, 300);
        let start = Instant::now();

        for _ in 0..5 {
            assert!(limiter.allow_at("learner-1", start).allowed);
        }
        assert!(!limiter.allow_at("learner-1", start + Duration::from_secs(299)).allowed);
        assert!(limiter.allow_at("learner-1", start + Duration::from_secs(300)).allowed);
    }

    #[test]
    fn test_learners_are_independent() {
        let limiter = RateLimiter::new(1, 300);
        let now = Instant::now();

        assert!(limiter.allow_at("learner-1", now).allowed);
        assert!(limiter.allow_at("learner-2", now).allowed);
        assert!(!limiter.allow_at("learner-1", now).allowed);
    }

    #[test]
    fn test_retry_after_is_positive() {
        let limiter = RateLimiter::new(1, 300);
        let now = Instant::now();

        assert!(limiter.allow_at("learner-1", now).allowed);
        let decision = limiter.allow_at("learner-1", now + Duration::from_millis(299_900));
        assert!(!decision.allowed);
        assert!(decision.retry_after_secs >= 1);
    }
}
