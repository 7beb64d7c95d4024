//! Timeouts and bounded retries for remote calls.

use std::{future::Future, time::Duration};

use crate::{error::StoreOperation, remote::RemoteError};

/// How long to wait for a remote call and how often to repeat it.
///
/// Only failures where [RemoteError::is_retryable] is true are repeated, and a
/// timed out call is only repeated if its operation is idempotent. The wait
/// between attempts starts at `initial_backoff` and doubles after each attempt,
/// up to `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The total number of attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// How long a single attempt may take before it counts as a [RemoteError::Timeout].
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            timeout,
        }
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out.
    ///
    /// A timed out insert may still have been stored, so timeouts are only
    /// retried when [StoreOperation::is_idempotent] is true for `operation`.
    pub async fn run<T, F, Fut>(
        &self,
        operation: StoreOperation,
        mut call: F,
    ) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(self.timeout)),
            };

            match result {
                Err(error) if attempt < max_attempts && may_retry(operation, &error) => {
                    tracing::warn!(
                        "attempt {attempt}/{max_attempts} to {operation} failed: {error}, \
                        retrying in {backoff:?}"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.max_backoff);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

fn may_retry(operation: StoreOperation, error: &RemoteError) -> bool {
    match error {
        RemoteError::Timeout(_) => operation.is_idempotent(),
        error => error.is_retryable(),
    }
}
