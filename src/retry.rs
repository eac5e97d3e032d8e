//! Bounded retry with backoff.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Run `op` until it succeeds, fails with an error `retryable` rejects, or
/// `max_attempts` attempts have been made. The last error is returned.
///
/// Between attempts the task sleeps for `backoff(attempt, elapsed)`, where
/// `attempt` counts from 1 and `elapsed` is how long the failed attempt took.
pub async fn retry_with_backoff<T, E, F, Fut, B, R>(
    max_attempts: u32,
    backoff: B,
    retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: Fn(u32, Duration) -> Duration,
    R: Fn(&E) -> bool,
    E: fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let start = Instant::now();
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts || !retryable(&e) => return Err(e),
            Err(e) => {
                let delay = backoff(attempt, start.elapsed());
                debug!(attempt, max_attempts, delay_ms = delay.as_millis() as u64, error = %e, "attempt failed, retrying");
                sleep(delay).await;
            }
        }
    }
}

/// `base + elapsed * attempt`.
pub fn linear_backoff(base: Duration) -> impl Fn(u32, Duration) -> Duration {
    move |attempt, elapsed| base + elapsed * attempt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_grows_with_slow_attempts() {
        let backoff = linear_backoff(Duration::from_millis(500));
        assert_eq!(backoff(1, Duration::ZERO), Duration::from_millis(500));
        assert_eq!(backoff(2, Duration::from_millis(100)), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();
        let result: Result<u32, String> = retry_with_backoff(
            3,
            linear_backoff(Duration::from_millis(500)),
            |_| true,
            move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(format!("attempt {n}")) } else { Ok(n) }
            },
        )
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two sleeps of the base delay; the failed attempts took no time.
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), String> = retry_with_backoff(
            3,
            linear_backoff(Duration::from_millis(10)),
            |_| true,
            move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("attempt {n}"))
            },
        )
        .await;
        assert_eq!(result, Err("attempt 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn final_errors_stop_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), String> = retry_with_backoff(
            3,
            linear_backoff(Duration::from_millis(10)),
            |e: &String| e != "fatal",
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
