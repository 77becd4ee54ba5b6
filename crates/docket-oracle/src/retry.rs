//! Bounded retry with exponential backoff
//!
//! Retries are explicit and bounded: a capability call either succeeds
//! within the budget or returns its classified error. Permanent failures
//! are never retried.

use crate::CapabilityError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `1 + max_retries` times, sleeping `initial_backoff * 2^n`
/// between attempts. Only [`CapabilityError::Transient`] failures are
/// retried; the last error is returned when the budget is exhausted.
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    initial_backoff: Duration,
    mut op: F,
) -> Result<T, CapabilityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CapabilityError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = initial_backoff * 2u32.saturating_pow(attempt);
                warn!(attempt, ?delay, "transient capability failure, retrying: {}", e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
