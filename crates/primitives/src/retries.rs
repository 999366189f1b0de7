use std::{future::Future, time::Duration};

use tokio_retry::{RetryIf, strategy::ExponentialBackoff};

/// The default maximum number of retries for a failed request.
///
/// With a base of 2ms and a factor of 25 the delays are 50ms, 100ms, 200ms,
/// 400ms and 800ms, so a request gives up after roughly 1.5s of waiting.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// The default exponential base in milliseconds.
const DEFAULT_BACKOFF_BASE_MS: u64 = 2;

/// Multiplier applied to every backoff step.
const DEFAULT_BACKOFF_FACTOR: u64 = 25;

/// Upper bound for a single backoff step.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// The backoff schedule used by [`retry_with_backoff_if`].
pub fn default_backoff() -> impl Iterator<Item = Duration> + Clone {
    ExponentialBackoff::from_millis(DEFAULT_BACKOFF_BASE_MS)
        .factor(DEFAULT_BACKOFF_FACTOR)
        .max_delay(MAX_BACKOFF)
        .take(DEFAULT_MAX_RETRIES)
}

/// Retry the provided async operation using [`ExponentialBackoff`].
///
/// Retries are attempted as long as the provided `condition` returns `true` for
/// the error produced by the operation, up to [`DEFAULT_MAX_RETRIES`] times.
pub async fn retry_with_backoff_if<F, Fut, T, E, C>(op: F, condition: C) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&E) -> bool,
{
    RetryIf::spawn(default_backoff(), op, condition).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn backoff_schedule_is_bounded() {
        let delays: Vec<_> = default_backoff().collect();
        assert_eq!(delays.len(), DEFAULT_MAX_RETRIES);
        assert_eq!(delays[0], Duration::from_millis(50));
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicUsize::new(0);
        let result: Result<usize, &str> = retry_with_backoff_if(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err("transient") } else { Ok(n) }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_on_non_retryable_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &str> = retry_with_backoff_if(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            },
            |e| *e != "fatal",
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
