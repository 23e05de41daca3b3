//! Async retry loop for tokio-based callers.

use super::{finish, RetryError};
use crate::context::{CancelContext, Context};
use crate::strategy::{should_attempt, Sleep, Strategy};
use futures::future::{self, Either};
use std::cell::Cell;
use std::future::Future;
use std::time::Duration;

/// Collects the waits strategies ask for so they can be awaited afterwards.
#[derive(Debug, Default)]
struct PlannedSleep {
    total: Cell<Duration>,
}

impl Sleep for PlannedSleep {
    fn sleep(&self, duration: Duration) {
        self.total.set(self.total.get().saturating_add(duration));
    }
}

/// Async counterpart of [`retry_with_context`](super::retry_with_context).
///
/// Strategies are evaluated synchronously; the waits they request are then
/// awaited with [`tokio::time::sleep`], racing [`CancelContext::cancelled`] so
/// that a cancellation ends the wait at once. Attempt numbering, stopping, and
/// error precedence are the same as for the blocking loop.
///
/// The action receives `ctx` and the attempt number. The returned future may
/// borrow `ctx`, e.g. to race its own work against `ctx.cancelled()`.
///
/// The returned future borrows `strategies`, which are not required to be
/// `Sync`, so it is not `Send`. Await it directly or from a `LocalSet`.
///
/// # Errors
///
/// Same as [`retry_with_context`](super::retry_with_context).
///
/// # Examples
///
/// ```rust
/// use reattempt::context::CancelContext;
/// use reattempt::strategy::{limit, wait};
/// use reattempt::retry_async;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let ctx = CancelContext::new();
/// let result = retry_async(
///     &ctx,
///     |_ctx, attempt| async move { if attempt == 0 { Err("cold") } else { Ok("warm") } },
///     &[&limit(3), &wait([Duration::from_millis(1)])],
/// )
/// .await;
///
/// assert_eq!(result, Ok("warm"));
/// # });
/// ```
pub async fn retry_async<'c, T, E, F, Fut>(
    ctx: &'c CancelContext,
    mut action: F,
    strategies: &[&dyn Strategy],
) -> Result<T, RetryError<E>>
where
    F: FnMut(&'c CancelContext, u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_error = None;
    let mut attempt = 0u32;

    loop {
        let planned = PlannedSleep::default();
        let proceed = should_attempt(attempt, &planned, strategies);

        let pause = planned.total.get();
        if !pause.is_zero() {
            let sleep = tokio::time::sleep(pause);
            let cancelled = ctx.cancelled();
            futures::pin_mut!(sleep, cancelled);
            if let Either::Right((_reason, _)) = future::select(sleep, cancelled).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, ?pause, "backoff interrupted by cancellation");
            }
        }

        if !proceed || ctx.err().is_some() {
            break;
        }

        match action(ctx, attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, "attempt failed");
                last_error = Some(err);
            }
        }
        attempt = attempt.saturating_add(1);
    }

    finish(ctx.err(), last_error, attempt)
}
