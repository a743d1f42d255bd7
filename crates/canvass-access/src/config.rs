//! Decision engine configuration.

use std::time::Duration;

use chrono::TimeDelta;

/// Configuration for the access decision service.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Maximum number of prior UPDATE/DELETE attempts tolerated inside
    /// the rate window (default: 10). A request is denied once the
    /// window count exceeds this value.
    pub rate_limit: u64,
    /// Length of the trailing rate window in seconds (default: 60).
    pub rate_window_secs: u64,
    /// Upper bound for each collaborator call in milliseconds
    /// (default: 2000). Expiry is treated as an internal error.
    pub store_timeout_ms: u64,
}

impl AccessConfig {
    /// Trailing rate window, or `None` if `rate_window_secs` does not fit
    /// a `TimeDelta`.
    pub fn rate_window(&self) -> Option<TimeDelta> {
        i64::try_from(self.rate_window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            rate_limit: 10,
            rate_window_secs: 60,
            store_timeout_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_sixty_seconds() {
        assert_eq!(
            AccessConfig::default().rate_window(),
            Some(TimeDelta::seconds(60))
        );
    }

    #[test]
    fn oversized_window_is_none() {
        for secs in [u64::MAX, i64::MAX as u64, 100_000_000_000_000_000] {
            let config = AccessConfig {
                rate_window_secs: secs,
                ..AccessConfig::default()
            };
            assert!(config.rate_window().is_none(), "{secs}");
        }
    }
}
