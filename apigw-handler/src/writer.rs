use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::error::StoreError;
use crate::record::Record;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// One attempt, no backoff.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before the retry that follows attempt `attempt_index` (0-based).
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }
}

pub struct StoreWriter<'a, S> {
    store: &'a S,
    table: &'a str,
    policy: RetryPolicy,
}

impl<'a, S: RecordStore> StoreWriter<'a, S> {
    pub fn new(store: &'a S, table: &'a str, policy: RetryPolicy) -> Self {
        Self {
            store,
            table,
            policy,
        }
    }

    pub async fn put(&self, record: &Record, request_id: &str) -> Result<(), StoreError> {
        let max_attempts = self.policy.max_attempts.max(1);

        // Retry loop for throttled writes
        let mut attempts = 0;
        loop {
            attempts += 1;
            let err = match self.store.put_record(self.table, record).await {
                Ok(()) => return Ok(()),
                Err(err) if !err.is_throttled() => return Err(err),
                Err(err) => err,
            };

            if attempts >= max_attempts {
                error!(
                    event = "dynamodb_throttled_max_retries",
                    request_id,
                    error_code = err.code(),
                    attempts,
                );
                return Err(err);
            }

            let wait = self.policy.backoff(attempts - 1);
            warn!(
                event = "dynamodb_throttled",
                request_id,
                attempt = attempts,
                wait_ms = wait.as_millis() as u64,
                error_code = err.code(),
            );
            sleep(wait).await;
        }
    }
}
