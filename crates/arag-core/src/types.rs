//! Common types used across the workspace

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for provider retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly with each further attempt
    pub base_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after `attempt` (1-based) failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}
