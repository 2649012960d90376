//! Resilience helpers for calls that leave the process
//!
//! Two patterns, both small enough to wrap any future:
//! - **Timeout**: every database or object-storage call must complete within
//!   a bound or fail, never hang.
//! - **Retry**: bounded retry with exponential backoff and jitter, reserved
//!   for idempotent operations.
//!
//! # Example: object-storage delete with timeout and retry
//!
//! ```rust,no_run
//! use resilience::{presets, with_retry, with_timeout_result};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = presets::object_storage_config();
//!     let retry = cfg.retry.expect("deletes are retried");
//!
//!     let result = with_retry(retry, || async {
//!         with_timeout_result(cfg.timeout.duration, async {
//!             // delete_object(...).send()
//!             Ok::<_, String>(())
//!         })
//!         .await
//!     })
//!     .await;
//!     let _ = result;
//! }
//! ```

pub mod presets;
pub mod retry;
pub mod timeout;

pub use presets::{database_config, object_storage_config, ServiceConfig};
pub use retry::{with_retry, RetryConfig, RetryError};
pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
