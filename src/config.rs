//! Session configuration.

use std::time::Duration;

/// Configuration for an [`SnmpSession`](crate::session::SnmpSession).
///
/// The core consumes these as already-parsed values; loading them from files
/// or flags is the embedding application's concern.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Community credential for v1/v2c-style engines (default: `"public"`).
    pub community: String,
    /// Per-request timeout, forwarded to the engine (default: 1 second).
    pub timeout: Duration,
    /// Per-request retry count, forwarded to the engine (default: 1).
    pub retries: u32,
    /// Max-repetitions for iterative bulk retrieval (default: 10).
    pub max_repetitions: u32,
    /// Total bound on a full-tree or table walk (default: 900 seconds).
    pub walk_timeout: Duration,
    /// Per-request column cap for row-targeted retrieval; 0 means use the
    /// engine's default (default: 0).
    pub max_columns_per_request: u32,
    /// Per-request row cap for row-targeted retrieval; 0 means use the
    /// engine's default (default: 0).
    pub max_rows_per_request: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            community: "public".to_string(),
            timeout: Duration::from_secs(1),
            retries: 1,
            max_repetitions: 10,
            walk_timeout: Duration::from_secs(900),
            max_columns_per_request: 0,
            max_rows_per_request: 0,
        }
    }
}

impl SessionConfig {
    /// Set the total walk timeout.
    pub fn with_walk_timeout(mut self, timeout: Duration) -> Self {
        self.walk_timeout = timeout;
        self
    }

    /// Set the community credential.
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    /// Set max-repetitions for bulk retrieval.
    pub fn with_max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.community, "public");
        assert_eq!(config.retries, 1);
        assert_eq!(config.max_repetitions, 10);
        assert_eq!(config.walk_timeout, Duration::from_secs(900));
        assert_eq!(config.max_columns_per_request, 0);
    }

    #[test]
    fn builder_style_overrides() {
        let config = SessionConfig::default()
            .with_walk_timeout(Duration::from_millis(5))
            .with_community("private")
            .with_max_repetitions(25);
        assert_eq!(config.walk_timeout, Duration::from_millis(5));
        assert_eq!(config.community, "private");
        assert_eq!(config.max_repetitions, 25);
    }
}
