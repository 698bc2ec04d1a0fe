//! Async retry utilities with exponential backoff.

use std::time::Duration;

/// Default base delay in milliseconds for exponential backoff.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Retry an async operation with exponential backoff, returning the
/// operation's value on success.
///
/// Returns `Ok(value)` on success, or `Err((error, attempts))` once
/// `max_attempts` has been exhausted.
pub async fn retry_with_backoff_async<F, Fut, T, E>(
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    mut operation: F,
) -> Result<T, (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempts >= max_attempts.max(1) {
                    return Err((e, attempts));
                }
                let delay_ms = (base_delay_ms.saturating_mul(2_u64.pow(attempts - 1)))
                    .min(max_delay_ms.max(base_delay_ms));
                let delay = Duration::from_millis(delay_ms);
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "retrying after transient broker error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
