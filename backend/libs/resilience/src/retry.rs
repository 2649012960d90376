/// Bounded retry with exponential backoff and jitter
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first failure.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single backoff.
    pub max_backoff: Duration,
    /// Multiplier applied between attempts.
    pub backoff_multiplier: f64,
    /// Randomize each backoff by up to ±30%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// All attempts failed; carries the final error.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: E },
}

impl<E> RetryError<E> {
    pub fn into_source(self) -> E {
        match self {
            RetryError::Exhausted { source, .. } => source,
        }
    }
}

/// Run `f` until it succeeds or `max_retries` additional attempts are spent.
///
/// Only use this for idempotent operations; a retried create without a
/// deduplication key can produce duplicates.
pub async fn with_retry<F, Fut, T, E>(config: RetryConfig, mut f: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut backoff = config.initial_backoff;
    let mut attempt = 0u32;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if attempt > config.max_retries {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        source: e,
                    });
                }

                let delay = apply_jitter(backoff, config.jitter);
                warn!(
                    "retry attempt {}/{} after error: {}, backing off {:?}",
                    attempt, config.max_retries, e, delay
                );
                tokio::time::sleep(delay).await;

                backoff = Duration::from_millis(
                    ((backoff.as_millis() as f64 * config.backoff_multiplier)
                        .min(config.max_backoff.as_millis() as f64)) as u64,
                );
            }
        }
    }
}

fn apply_jitter(backoff: Duration, jitter: bool) -> Duration {
    if !jitter {
        return backoff;
    }
    let base = backoff.as_millis() as f64;
    let factor = rand::thread_rng().gen_range(0.7..=1.3);
    Duration::from_millis((base * factor) as u64)
}
