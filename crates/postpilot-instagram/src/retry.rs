//! Fixed-attempt retry for Graph API calls.
//!
//! The publish step is the one call the upstream routinely rejects while a
//! freshly created container is still propagating, so it gets exactly one
//! extra attempt after a fixed delay. [`retry_after_delay`] is the shared
//! combinator: any step that needs the same policy wraps itself in it rather
//! than duplicating the call site.

use std::future::Future;
use std::time::Duration;

use crate::error::InstagramError;

/// Returns `true` for errors that are worth retrying after the fixed delay.
///
/// **Retriable:**
/// - [`InstagramError::Http`] — network-level failure: timeout, connection reset.
/// - [`InstagramError::Upstream`] — the API rejected the call; for the publish
///   step this is the documented transient propagation/rate-limit mode.
///
/// **Not retriable (hard stop):**
/// - [`InstagramError::Deserialize`] — malformed response; retrying won't fix it.
/// - [`InstagramError::InvalidUrl`] — construction bug; retrying won't fix it.
pub(crate) fn is_transient(err: &InstagramError) -> bool {
    matches!(
        err,
        InstagramError::Http(_) | InstagramError::Upstream { .. }
    )
}

/// Runs `operation` with up to `extra_attempts` additional attempts on
/// transient errors, sleeping a fixed `delay` before each retry.
///
/// No backoff growth, no jitter: the upstream publish behaviour this models
/// is a short propagation delay, not sustained congestion.
pub(crate) async fn retry_after_delay<T, F, Fut>(
    extra_attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, InstagramError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InstagramError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_transient(&err) || attempt >= extra_attempts {
                    return Err(err);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    extra_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient Graph API error — retrying after fixed delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::Endpoint;

    fn upstream_err() -> InstagramError {
        InstagramError::Upstream {
            endpoint: Endpoint::MediaPublish,
            status: 500,
            body: "transient".to_owned(),
        }
    }

    fn deserialize_err() -> InstagramError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        InstagramError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn upstream_error_is_transient() {
        assert!(is_transient(&upstream_err()));
    }

    #[test]
    fn deserialize_error_is_not_transient() {
        assert!(!is_transient(&deserialize_err()));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_after_delay(1, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, InstagramError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_exactly_once_then_surfaces_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_after_delay(1, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(upstream_err())
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            2,
            "one initial attempt plus exactly one retry"
        );
        assert!(matches!(
            result,
            Err(InstagramError::Upstream { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn retry_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_after_delay(1, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(upstream_err())
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_after_delay(1, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(deserialize_err())
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "deserialize errors must not be retried"
        );
        assert!(matches!(result, Err(InstagramError::Deserialize { .. })));
    }
}
