//! Cancellation contexts for retry loops.
//!
//! A [`Context`] lets a caller stop a retry loop from the outside. It exposes a
//! non-blocking poll ([`Context::err`]) and, through its [`Sleep`] supertrait,
//! a wait that returns as soon as the context is cancelled.
//!
//! - [`Background`] is never cancelled.
//! - [`CancelContext`] is cancelled explicitly with [`CancelContext::cancel`]
//!   or implicitly when its deadline passes.
//!
//! # Examples
//!
//! ```rust
//! use reattempt::context::{CancelContext, Cancelled, Context};
//! use std::time::Duration;
//!
//! let ctx = CancelContext::with_timeout(Duration::from_secs(30));
//! let handle = ctx.clone();
//!
//! assert_eq!(ctx.err(), None);
//! handle.cancel();
//! assert_eq!(ctx.err(), Some(Cancelled::Canceled));
//! ```

use crate::strategy::Sleep;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Why a context was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cancelled {
    /// [`CancelContext::cancel`] was called.
    Canceled,
    /// The context's deadline passed.
    DeadlineExceeded,
}

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canceled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl std::error::Error for Cancelled {}

/// An external stop signal observed by the retry loop.
///
/// [`Sleep::sleep`] must return early once the context is cancelled.
pub trait Context: Sleep {
    /// `Some` once the context is cancelled. Never blocks.
    fn err(&self) -> Option<Cancelled>;
}

/// A context that is never cancelled and sleeps with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Background;

impl Sleep for Background {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl Context for Background {
    fn err(&self) -> Option<Cancelled> {
        None
    }
}

#[derive(Debug)]
struct Inner {
    canceled: Mutex<bool>,
    wakeup: Condvar,
    deadline: Option<Instant>,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

/// A cancellable context with an optional deadline.
///
/// Clones share the same cancellation state, so one clone can be handed to
/// another thread to cancel a retry loop driven with the other.
#[derive(Debug, Clone)]
pub struct CancelContext {
    inner: Arc<Inner>,
}

impl CancelContext {
    /// A context without a deadline, cancelled only by [`cancel`](Self::cancel).
    pub fn new() -> Self {
        Self::with_optional_deadline(None)
    }

    /// A context that reports [`Cancelled::DeadlineExceeded`] from `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::with_optional_deadline(Some(deadline))
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_optional_deadline(Instant::now().checked_add(timeout))
    }

    fn with_optional_deadline(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                canceled: Mutex::new(false),
                wakeup: Condvar::new(),
                deadline,
                #[cfg(feature = "async")]
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Cancel the context and wake every sleeper. Idempotent.
    pub fn cancel(&self) {
        *self.lock() = true;
        self.inner.wakeup.notify_all();
        #[cfg(feature = "async")]
        self.inner.notify.notify_waiters();
    }

    /// Shorthand for `self.err().is_some()`.
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    // A poisoned lock still holds a valid bool.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner
            .canceled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, canceled: bool, now: Instant) -> Option<Cancelled> {
        if canceled {
            return Some(Cancelled::Canceled);
        }
        match self.inner.deadline {
            Some(deadline) if now >= deadline => Some(Cancelled::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled, by either cause.
    #[cfg(feature = "async")]
    pub async fn cancelled(&self) -> Cancelled {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent cancel is not missed.
            notified.as_mut().enable();

            if let Some(reason) = self.err() {
                return reason;
            }

            match self.inner.deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep_until(deadline.into()) => {}
                    }
                }
                None => notified.await,
            }
        }
    }
}

impl Default for CancelContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleep for CancelContext {
    fn sleep(&self, duration: Duration) {
        let start = Instant::now();
        let wake_at = match (start.checked_add(duration), self.inner.deadline) {
            (Some(wake_at), Some(deadline)) => wake_at.min(deadline),
            (Some(wake_at), None) => wake_at,
            (None, Some(deadline)) => deadline,
            (None, None) => {
                // Effectively forever: wait for a cancel.
                let mut canceled = self.lock();
                while !*canceled {
                    canceled = self
                        .inner
                        .wakeup
                        .wait(canceled)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                return;
            }
        };

        let mut canceled = self.lock();
        loop {
            let now = Instant::now();
            if *canceled || now >= wake_at {
                return;
            }
            canceled = self
                .inner
                .wakeup
                .wait_timeout(canceled, wake_at - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}

impl Context for CancelContext {
    fn err(&self) -> Option<Cancelled> {
        let canceled = *self.lock();
        self.check(canceled, Instant::now())
    }
}
