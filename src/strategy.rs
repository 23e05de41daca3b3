//! Strategies decide whether the next attempt is made, and may wait first.
//!
//! A [`Strategy`] is consulted before every attempt, including the first
//! (attempt `0`). Strategies are stateless: each decision depends only on the
//! attempt number and the strategy's construction parameters. Time-based
//! strategies never sleep on their own; they wait through the [`Sleep`]
//! capability handed to them, so a cancellation can cut the wait short.
//!
//! Strategies compose with [`should_attempt`]: all must agree, and evaluation
//! stops at the first refusal.
//!
//! # Examples
//!
//! ```rust
//! use reattempt::strategy::{backoff, limit, should_attempt, Strategy};
//! use reattempt::backoff::linear;
//! use std::time::Duration;
//!
//! let three_attempts = limit(3);
//! let linear_backoff = backoff(linear(Duration::from_millis(1)));
//! let strategies: [&dyn Strategy; 2] = [&three_attempts, &linear_backoff];
//!
//! let sleep = std::thread::sleep;
//! assert!(should_attempt(2, &sleep, &strategies));
//! assert!(!should_attempt(3, &sleep, &strategies));
//! ```

use crate::backoff::BackoffAlgorithm;
use crate::jitter::Jitter;
use std::time::Duration;

/// A suspension primitive that strategies wait through.
///
/// Implementations may return early, e.g. when a cancellation fires; callers
/// must not assume the full duration has elapsed.
pub trait Sleep {
    /// Wait for up to `duration`.
    fn sleep(&self, duration: Duration);
}

impl<F> Sleep for F
where
    F: Fn(Duration),
{
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

/// Decides whether attempt `attempt` should be made.
///
/// Returning `true` allows the attempt; returning `false` stops the retry loop,
/// which then reports the last error returned by the action.
///
/// Any `Fn(u32, &dyn Sleep) -> bool` closure is a strategy.
pub trait Strategy {
    /// Decide on `attempt`, waiting through `sleep` if needed.
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool;
}

impl<F> Strategy for F
where
    F: Fn(u32, &dyn Sleep) -> bool,
{
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool {
        self(attempt, sleep)
    }
}

/// Evaluates `strategies` in order for `attempt`.
///
/// Stops at the first strategy that returns `false`; strategies after it are
/// not evaluated and do not wait. With no strategies, always returns `true`.
pub fn should_attempt(attempt: u32, sleep: &dyn Sleep, strategies: &[&dyn Strategy]) -> bool {
    strategies
        .iter()
        .all(|strategy| strategy.should_attempt(attempt, sleep))
}

/// Allows attempts `0..attempt_limit`. See [`limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    attempt_limit: u32,
}

/// Waits before the first attempt only. See [`delay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    duration: Duration,
}

/// Waits from a table of durations before each retry. See [`wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wait {
    durations: Vec<Duration>,
}

/// Waits by a backoff algorithm before each retry. See [`backoff`].
#[derive(Debug, Clone)]
pub struct Backoff<A> {
    algorithm: A,
}

/// Waits by a jittered backoff algorithm before each retry. See
/// [`backoff_with_jitter`].
#[derive(Debug, Clone)]
pub struct BackoffWithJitter<A, J> {
    algorithm: A,
    jitter: J,
}

/// Limits the total number of attempts.
///
/// Attempts are 0-based: `limit(3)` allows attempts 0, 1 and 2 (three calls of
/// the action) and refuses attempt 3.
pub fn limit(attempt_limit: u32) -> Limit {
    Limit { attempt_limit }
}

/// Waits `duration` before the first attempt, and never again.
pub fn delay(duration: Duration) -> Delay {
    Delay { duration }
}

/// Waits before each retry, taking durations from `durations` in order.
///
/// Attempt `n > 0` waits `durations[n - 1]`; once the table runs out the last
/// duration repeats. An empty table never waits.
///
/// # Examples
///
/// ```rust
/// use reattempt::strategy::wait;
/// use std::time::Duration;
///
/// // 10ms before the first retry, then 50ms before every later one.
/// let strategy = wait([Duration::from_millis(10), Duration::from_millis(50)]);
/// ```
pub fn wait(durations: impl IntoIterator<Item = Duration>) -> Wait {
    Wait {
        durations: durations.into_iter().collect(),
    }
}

/// Waits `algorithm(n)` before each retry `n > 0`.
pub fn backoff<A: BackoffAlgorithm>(algorithm: A) -> Backoff<A> {
    Backoff { algorithm }
}

/// Waits `jitter(algorithm(n))` before each retry `n > 0`.
///
/// # Panics
///
/// Evaluating the strategy panics if `jitter` rejects the backoff duration,
/// e.g. [`FullRandom`](crate::jitter::FullRandom) with an algorithm that yields
/// a zero duration. That combination is a configuration bug.
///
/// A decaying curve reaches zero too: [`exponential`](crate::backoff::exponential)
/// with a base below `1.0` rounds to 0ns after enough attempts
/// (`exponential(1ms, 0.5)` does at attempt 21), and from then on every retry
/// panics. Pair such curves with a [`limit`] or a jitter that accepts zero.
pub fn backoff_with_jitter<A: BackoffAlgorithm, J: Jitter>(
    algorithm: A,
    jitter: J,
) -> BackoffWithJitter<A, J> {
    BackoffWithJitter { algorithm, jitter }
}

impl Strategy for Limit {
    fn should_attempt(&self, attempt: u32, _sleep: &dyn Sleep) -> bool {
        attempt < self.attempt_limit
    }
}

impl Strategy for Delay {
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool {
        if attempt == 0 {
            sleep.sleep(self.duration);
        }
        true
    }
}

impl Strategy for Wait {
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool {
        if attempt > 0 {
            if let Some(last) = self.durations.last() {
                let index = (attempt - 1) as usize;
                sleep.sleep(*self.durations.get(index).unwrap_or(last));
            }
        }
        true
    }
}

impl<A: BackoffAlgorithm> Strategy for Backoff<A> {
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool {
        if attempt > 0 {
            sleep.sleep(self.algorithm.backoff(attempt));
        }
        true
    }
}

impl<A: BackoffAlgorithm, J: Jitter> Strategy for BackoffWithJitter<A, J> {
    fn should_attempt(&self, attempt: u32, sleep: &dyn Sleep) -> bool {
        if attempt > 0 {
            let base = self.algorithm.backoff(attempt);
            match self.jitter.jitter(base) {
                Ok(duration) => sleep.sleep(duration),
                Err(err) => panic!("backoff of {:?} at attempt {}: {}", base, attempt, err),
            }
        }
        true
    }
}
