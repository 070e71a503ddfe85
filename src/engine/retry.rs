use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Bounded retry for transient platform failures. The delay doubles after each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            retry_delay_ms: 0,
        }
    }

    /// Run `f`, retrying only errors for which `Error::is_transient` holds.
    pub fn run<T, F>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut retry_delay = Duration::from_millis(self.retry_delay_ms);
        let mut attempt = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} failed ({}); retry {}/{} in {:?}",
                        operation, e, attempt, self.max_retries, retry_delay
                    );
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
