use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation with growing delays.
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `base_delays` - Delays before each early retry
/// * `final_retries` - Number of additional retries at `final_delay`
/// * `final_delay` - Delay between the final retries
///
/// # Returns
/// The result of the operation if successful, or the last error if all retries fail
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    base_delays: &[Duration],
    final_retries: usize,
    final_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let total_attempts = 1 + base_delays.len() + final_retries;
    let delays = base_delays
        .iter()
        .copied()
        .chain(std::iter::repeat_n(final_delay, final_retries));

    let mut last_error = match operation().await {
        Ok(result) => return Ok(result),
        Err(e) => e,
    };

    for (i, delay) in delays.enumerate() {
        warn!(
            "Request failed (attempt {}/{total_attempts}): {last_error}. Retrying after {}ms...",
            i + 1,
            delay.as_millis()
        );
        sleep(delay).await;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SHORT: [Duration; 2] = [Duration::from_millis(1), Duration::from_millis(2)];

    #[tokio::test]
    async fn test_retry_succeeds_on_first_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
            &SHORT,
            2,
            Duration::from_millis(1),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(String::from("fail"))
                    } else {
                        Ok(())
                    }
                }
            },
            &SHORT,
            2,
            Duration::from_millis(1),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_after_all_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("fail"))
                }
            },
            &SHORT,
            2,
            Duration::from_millis(1),
        )
        .await;
        assert_eq!(result, Err(String::from("fail")));
        assert_eq!(attempts.load(Ordering::SeqCst), 5); // 1 initial + 2 base + 2 final
    }
}
