//! Decides when retrying a passphrase request is pointless.

/// Attempts allowed before giving up: the first try plus three retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Maximum number of failed attempts tolerated for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
}

impl AttemptPolicy {
    /// Gives up once `max_attempts` earlier attempts have failed.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt` counts how many times the same request has already failed.
    pub fn should_give_up(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = AttemptPolicy::default();
        for attempt in 0..DEFAULT_MAX_ATTEMPTS {
            assert!(!policy.should_give_up(attempt), "attempt {attempt}");
        }
        assert!(policy.should_give_up(DEFAULT_MAX_ATTEMPTS));
        assert!(policy.should_give_up(u32::MAX));
    }

    #[test]
    fn test_custom_threshold() {
        let policy = AttemptPolicy::new(1);
        assert!(!policy.should_give_up(0));
        assert!(policy.should_give_up(1));
        assert_eq!(policy.max_attempts(), 1);
    }
}
