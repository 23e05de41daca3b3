//! The retry loop.
//!
//! The loop is a mechanical executor: it calls the action, and before every
//! attempt (including the first) asks the strategies whether to go on. It never
//! classifies errors; whether an error is worth retrying is the action's call,
//! expressed by what it returns, and the caller's, expressed by the strategies
//! it composes.
//!
//! ```text
//! attempt = 0
//! loop:
//!     if attempt > 0 and the last call succeeded -> done
//!     if !should_attempt(attempt, strategies)    -> done
//!     if context cancelled                       -> done
//!     call action(attempt); attempt += 1
//! ```
//!
//! On `done`, a success is returned as is. Otherwise a cancelled context wins
//! over the action's last error, because the caller asking to stop is a
//! stronger signal than the operation failing.
//!
//! Without a bounding strategy ([`limit`](crate::strategy::limit)) or a
//! deadline, an action that never succeeds is retried forever.
//!
//! # Quick Start
//!
//! ```rust
//! use reattempt::backoff::linear;
//! use reattempt::strategy::{backoff, limit};
//! use reattempt::retry;
//! use std::time::Duration;
//!
//! let value = retry(
//!     |attempt| if attempt < 2 { Err("not yet") } else { Ok(attempt * 10) },
//!     &[&limit(5), &backoff(linear(Duration::from_millis(1)))],
//! );
//!
//! assert_eq!(value, Ok(20));
//! ```

mod error;

#[cfg(feature = "async")]
mod asynchronous;

pub use error::RetryError;

#[cfg(feature = "async")]
pub use asynchronous::retry_async;

use crate::context::{Background, Context};
use crate::strategy::{should_attempt, Strategy};

/// Calls `action` until it succeeds or a strategy refuses the next attempt.
///
/// `action` receives the 0-based attempt number. Waits requested by the
/// strategies block the current thread.
///
/// # Errors
///
/// - [`RetryError::Failed`] with the action's last error when a strategy
///   stops the loop.
/// - [`RetryError::NotAttempted`] when the strategies refuse attempt 0.
pub fn retry<T, E, F>(mut action: F, strategies: &[&dyn Strategy]) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Result<T, E>,
{
    retry_with_context(&Background, |_, attempt| action(attempt), strategies)
}

/// Like [`retry`], but stops as soon as `ctx` is cancelled.
///
/// Strategy waits go through `ctx`, so a cancellation cuts a backoff short.
/// The context is checked after the strategies agree and before every call of
/// `action`; a cancelled context is never attempted against.
///
/// # Errors
///
/// - [`RetryError::Cancelled`] when `ctx` was cancelled before the loop ended
///   without a success, even if the action failed too.
/// - [`RetryError::Failed`] with the action's last error when a strategy
///   stops the loop.
/// - [`RetryError::NotAttempted`] when the action never ran.
///
/// # Examples
///
/// ```rust
/// use reattempt::context::{CancelContext, Cancelled};
/// use reattempt::{retry_with_context, RetryError};
///
/// let ctx = CancelContext::new();
///
/// let result = retry_with_context(
///     &ctx,
///     |ctx, _attempt| {
///         ctx.cancel();
///         Err::<(), _>("gave up")
///     },
///     &[],
/// );
///
/// assert_eq!(result, Err(RetryError::Cancelled(Cancelled::Canceled)));
/// ```
pub fn retry_with_context<C, T, E, F>(
    ctx: &C,
    mut action: F,
    strategies: &[&dyn Strategy],
) -> Result<T, RetryError<E>>
where
    C: Context,
    F: FnMut(&C, u32) -> Result<T, E>,
{
    let mut last_error = None;
    let mut attempt = 0u32;

    while should_attempt(attempt, ctx, strategies) && ctx.err().is_none() {
        match action(ctx, attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, "attempt failed");
                last_error = Some(err);
            }
        }
        // Saturates rather than wraps so attempt numbers never go backwards.
        attempt = attempt.saturating_add(1);
    }

    finish(ctx.err(), last_error, attempt)
}

/// Picks the loop's reported error: cancellation, then the last failure.
fn finish<T, E>(
    cancelled: Option<crate::context::Cancelled>,
    last_error: Option<E>,
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))] attempts: u32,
) -> Result<T, RetryError<E>> {
    match (cancelled, last_error) {
        (Some(reason), _) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(attempts, %reason, "retry cancelled");
            Err(RetryError::Cancelled(reason))
        }
        (None, Some(err)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempts, "retry stopped by strategy");
            Err(RetryError::Failed(err))
        }
        (None, None) => Err(RetryError::NotAttempted),
    }
}
