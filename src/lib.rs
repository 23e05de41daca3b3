//! # Reattempt
//!
//! Composable retry strategies: call a fallible action until it succeeds or a
//! strategy says stop, then return the last outcome.
//!
//! The pieces, leaves first:
//!
//! - [`backoff`]: pure curves from attempt number to wait (linear,
//!   exponential, Fibonacci, ...).
//! - [`jitter`]: randomization of a computed wait.
//! - [`strategy`]: decisions made before each attempt (limits, delays, waits,
//!   backoff), composed with short-circuit AND.
//! - [`context`]: cancellation and deadlines that cut waits short.
//! - [`retry`](mod@retry): the loop that ties them together.
//!
//! ## Quick Example
//!
//! ```rust
//! use reattempt::backoff::binary_exponential;
//! use reattempt::jitter::full_random;
//! use reattempt::strategy::{backoff_with_jitter, limit};
//! use reattempt::{retry, RetryError};
//! use std::time::Duration;
//!
//! let mut pending = 2;
//! let result = retry(
//!     |_attempt| {
//!         if pending > 0 {
//!             pending -= 1;
//!             Err("service unavailable")
//!         } else {
//!             Ok("connected")
//!         }
//!     },
//!     &[
//!         &limit(5),
//!         &backoff_with_jitter(binary_exponential(Duration::from_millis(1)), full_random()),
//!     ],
//! );
//!
//! assert_eq!(result, Ok("connected"));
//!
//! let result = retry(|_| Err::<(), _>("down"), &[&limit(2)]);
//! assert_eq!(result, Err(RetryError::Failed("down")));
//! ```
//!
//! ## Features
//!
//! - `async`: `retry_async`, driven by tokio.
//! - `tracing`: debug events for failed attempts and stop decisions.
//! - `serde`: `Serialize`/`Deserialize` for the [`backoff`] algorithm types.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
pub mod context;
pub mod jitter;
pub mod retry;
pub mod strategy;

// Re-exports
pub use context::{CancelContext, Cancelled, Context};
pub use retry::{retry, retry_with_context, RetryError};
pub use strategy::{should_attempt, Sleep, Strategy};

#[cfg(feature = "async")]
pub use retry::retry_async;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{
        binary_exponential, exponential, fibonacci, incremental, linear, BackoffAlgorithm,
    };
    pub use crate::context::{Background, CancelContext, Cancelled, Context};
    pub use crate::jitter::{full_random, FullRandom, Jitter, NoJitter};
    pub use crate::retry::{retry, retry_with_context, RetryError};
    pub use crate::strategy::{
        backoff, backoff_with_jitter, delay, limit, wait, should_attempt, Sleep, Strategy,
    };

    #[cfg(feature = "async")]
    pub use crate::retry::retry_async;
}
