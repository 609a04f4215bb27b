//! Retry with exponential backoff bounded by total elapsed time

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Backoff schedule. Waits grow by `multiplier` up to `max_interval`; no new
/// attempt starts once the next wait would end past `max_elapsed_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    pub max_elapsed_time: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_interval)
    }
}

/// Run `op` until it succeeds or the elapsed-time budget runs out.
///
/// Attempts are strictly sequential. On exhaustion the last error is returned
/// unchanged.
pub async fn retry<T, E, F, Fut>(backoff: &Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let started = Instant::now();
    let mut interval = backoff.initial_interval;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let error = match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if started.elapsed() + interval > backoff.max_elapsed_time {
            warn!(
                attempts = attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %error,
                "retry budget exhausted"
            );
            return Err(error);
        }

        warn!(
            attempt,
            wait_ms = interval.as_millis() as u64,
            error = %error,
            "attempt failed, retrying"
        );
        tokio::time::sleep(interval).await;
        interval = backoff.next_interval(interval);
    }
}
