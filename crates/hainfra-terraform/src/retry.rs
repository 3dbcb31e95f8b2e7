//! Retry policy for known-transient Terraform failures

use crate::error::Result;
use regex::RegexSet;
use std::time::Duration;

/// stderr patterns that indicate a transient provider or registry problem.
pub const DEFAULT_RETRYABLE_ERRORS: &[&str] = &[
    r"(?i)RequestLimitExceeded",
    r"(?i)Throttling(Exception)?",
    r"(?i)TooManyRequests",
    r"(?i)rate exceeded",
    r"(?i)TLS handshake timeout",
    r"read: connection reset by peer",
    r"transport is closing",
    r"unable to verify signature",
    r"unable to verify checksum",
    r"registry service is unreachable",
    r"Error installing provider",
    r"Failed to query available provider packages",
    r"timeout while waiting for plugin to start",
    r"timed out waiting for server handshake",
    r"could not query provider registry for",
    r"Could not retrieve the list of available versions for provider",
];

/// How often and on which errors a Terraform sub-command is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Pause between attempts
    pub delay: Duration,

    patterns: RegexSet,
}

impl RetryPolicy {
    /// Policy with the default transient patterns
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        let patterns = RegexSet::new(DEFAULT_RETRYABLE_ERRORS).unwrap_or_else(|e| {
            tracing::error!("Default retry patterns failed to compile: {}", e);
            RegexSet::empty()
        });
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            patterns,
        }
    }

    /// Add extra retryable patterns on top of the current ones
    pub fn with_patterns<I, S>(mut self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all: Vec<String> = self.patterns.patterns().to_vec();
        all.extend(extra.into_iter().map(|s| s.as_ref().to_string()));
        self.patterns = RegexSet::new(all)?;
        Ok(self)
    }

    /// Whether a failure with this stderr should be retried
    pub fn is_retryable(&self, stderr: &str) -> bool {
        self.patterns.is_match(stderr)
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}
