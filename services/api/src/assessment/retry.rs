use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;

/// Body fields a rate-limited response may use to declare its wait, in
/// lookup order.
const RETRY_AFTER_FIELDS: &[&str] = &[
    "retry_after",
    "retryAfter",
    "retry_after_seconds",
    "retryAfterSeconds",
];
const MAX_DECLARED_RETRY_SECS: f64 = 3600.0;
const MAX_JITTER: Duration = Duration::from_millis(250);

/// Delay parameters shared by every call to the clinical API.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fallback wait per attempt for a 429 that declares no usable interval.
    pub rate_limit_step: Duration,
}

impl RetryPolicy {
    /// Wait for a rate-limited attempt. A declared interval is used as is;
    /// otherwise the step grows linearly with `attempt`, capped at `max_delay`.
    pub fn rate_limit_delay(&self, declared: Option<Duration>, attempt: u32) -> Duration {
        declared.unwrap_or_else(|| {
            self.rate_limit_step
                .saturating_mul(attempt.max(1))
                .min(self.max_delay)
        })
    }

    /// `base_delay * 2^(attempt - 1) + jitter`, capped at `max_delay`.
    pub fn exponential_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    /// Random jitter, kept below `base_delay` so consecutive exponential
    /// delays stay strictly increasing until the cap.
    pub fn jitter(&self) -> Duration {
        let ceiling = MAX_JITTER.min(self.base_delay).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..ceiling))
    }
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was classified as not retryable.
    Fatal(E),
    /// Every allowed attempt failed; `last` is the final failure.
    Exhausted { attempts: u32, last: E },
}

/// Run `op` until it succeeds, fails with a non-retryable error, or uses
/// up `max_retries` retries.
///
/// `delay_for` receives the failure and the 1-based number of the attempt
/// that produced it.
pub async fn retry_with<T, E, Op, Fut, C, D>(
    max_retries: u32,
    mut op: Op,
    is_retryable: C,
    delay_for: D,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    D: Fn(&E, u32) -> Duration,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err) {
            return Err(RetryError::Fatal(err));
        }
        if attempt > max_retries {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        let delay = delay_for(&err, attempt);
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Server-declared wait from a `Retry-After` header or a JSON body field.
///
/// Only values in (0, 3600] seconds are honored.
pub fn declared_retry_after(header: Option<&str>, body: &str) -> Option<Duration> {
    header
        .and_then(|h| h.trim().parse::<f64>().ok())
        .and_then(accept_seconds)
        .or_else(|| {
            let body: Value = serde_json::from_str(body).ok()?;
            RETRY_AFTER_FIELDS
                .iter()
                .find_map(|field| body.get(*field).and_then(seconds_from_value))
        })
        .map(Duration::from_secs_f64)
}

fn seconds_from_value(value: &Value) -> Option<f64> {
    let secs = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    accept_seconds(secs)
}

fn accept_seconds(secs: f64) -> Option<f64> {
    (secs.is_finite() && secs > 0.0 && secs <= MAX_DECLARED_RETRY_SECS).then_some(secs)
}
