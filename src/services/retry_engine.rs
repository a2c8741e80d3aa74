//! Retry engine: capped exponential backoff for chunk uploads.
//!
//! Network failures and non-4xx server errors are retried; a 4xx aborts the
//! upload immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, REJECTED_FALLBACK_MESSAGE};

/// Default initial backoff delay in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;
/// Default maximum backoff delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

fn is_client_error(status: u16) -> bool {
    (400..500).contains(&status)
}

/// Check whether an error is retryable.
///
/// Network errors are always retryable. Status errors are retryable unless
/// the status is a 4xx. All other errors are not.
pub fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::Network(_) => true,
        AppError::Status { status, .. } => !is_client_error(*status),
        _ => false,
    }
}

/// Backoff before retry number `retry_count` (0-based): `initial * 2^n`, capped.
pub fn calculate_delay(retry_count: u32, policy: &RetryPolicy) -> u64 {
    policy
        .initial_delay_ms
        .saturating_mul(1u64 << retry_count.min(31))
        .min(policy.max_delay_ms)
}

/// Retry a chunk upload operation with capped exponential backoff.
///
/// At most `policy.max_retries` retries follow the first attempt. A 4xx
/// becomes [`AppError::Rejected`], running out of retries becomes
/// [`AppError::RetriesExhausted`].
pub async fn retry_upload_chunk<F, Fut, T>(
    policy: &RetryPolicy,
    chunk_index: u32,
    mut operation: F,
) -> crate::error::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
{
    let mut retry_count: u32 = 0;
    let mut last_server_message: Option<String> = None;

    loop {
        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };

        if let Some(status) = err.status().filter(|s| is_client_error(*s)) {
            log::error!(
                "Chunk upload rejected: chunk_index={}, status={}, error={}",
                chunk_index,
                status,
                err
            );
            return Err(AppError::Rejected {
                chunk_index,
                message: err
                    .server_message()
                    .unwrap_or(REJECTED_FALLBACK_MESSAGE)
                    .to_string(),
            });
        }

        if !is_retryable(&err) {
            return Err(err);
        }

        if let Some(message) = err.server_message() {
            last_server_message = Some(message.to_string());
        }

        if retry_count >= policy.max_retries {
            log::error!(
                "Chunk upload failed after {} retries: chunk_index={}, error={}",
                retry_count,
                chunk_index,
                err
            );
            let message = last_server_message.unwrap_or_else(|| {
                format!(
                    "Failed to upload chunk {} after {} retries",
                    chunk_index, retry_count
                )
            });
            return Err(AppError::RetriesExhausted {
                chunk_index,
                retries: retry_count,
                message,
            });
        }

        let delay = calculate_delay(retry_count, policy);
        log::warn!(
            "Chunk upload retry: retry={}, chunk_index={}, delay_ms={}, error={}",
            retry_count + 1,
            chunk_index,
            delay,
            err
        );
        tokio::time::sleep(Duration::from_millis(delay)).await;

        retry_count += 1;
    }
}
