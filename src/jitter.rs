//! Jitter transforms: randomize a computed backoff so that independent callers
//! do not retry in lockstep.
//!
//! A [`Jitter`] is applied by the
//! [`backoff_with_jitter`](crate::strategy::backoff_with_jitter) strategy after
//! the [`BackoffAlgorithm`](crate::backoff::BackoffAlgorithm) has produced a
//! base duration.
//!
//! # Examples
//!
//! ```rust
//! use reattempt::jitter::{FullRandom, Jitter};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::time::Duration;
//!
//! let jitter = FullRandom::with_rng(StdRng::seed_from_u64(7));
//! let base = Duration::from_millis(100);
//!
//! let jittered = jitter.jitter(base).unwrap();
//! assert!(jittered < base);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Transforms a base backoff duration into the duration actually waited.
///
/// Any `Fn(Duration) -> Duration` closure is an infallible jitter.
pub trait Jitter {
    /// Transform `duration`, failing if it is outside this jitter's domain.
    fn jitter(&self, duration: Duration) -> Result<Duration, JitterError>;
}

impl<F> Jitter for F
where
    F: Fn(Duration) -> Duration,
{
    fn jitter(&self, duration: Duration) -> Result<Duration, JitterError> {
        Ok(self(duration))
    }
}

/// Error returned when a jitter cannot transform a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterError {
    /// Asked to draw from `[0, duration)` with a zero duration.
    EmptyRange,
}

impl std::fmt::Display for JitterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRange => write!(f, "cannot jitter a zero duration: [0, 0) is empty"),
        }
    }
}

impl std::error::Error for JitterError {}

/// Identity transform, for composing backoff without randomization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn jitter(&self, duration: Duration) -> Result<Duration, JitterError> {
        Ok(duration)
    }
}

/// Uniformly random duration in `[0, duration)` ("full jitter").
///
/// The generator is owned by this instance. Without one supplied, a generator
/// is seeded from the system clock the first time a duration is jittered.
///
/// `FullRandom` is deliberately not `Sync`: each retry loop should own its
/// jitter. Share one across threads only behind your own lock.
///
/// Durations longer than `u64::MAX` nanoseconds (about 584 years) are drawn
/// from that capped range.
///
/// A seeded generator makes draws repeatable, but [`StdRng`] does not promise
/// the same stream across `rand` releases. Pin a portable generator (for
/// example `rand_chacha::ChaCha8Rng`) if exact values must survive upgrades.
#[derive(Debug)]
pub struct FullRandom<R = StdRng> {
    rng: RefCell<Option<R>>,
}

impl FullRandom<StdRng> {
    /// Create a full jitter with a lazily seeded [`StdRng`].
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(None),
        }
    }
}

impl Default for FullRandom<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FullRandom<R> {
    /// Create a full jitter that draws from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: RefCell::new(Some(rng)),
        }
    }
}

impl<R: Rng + SeedableRng> Jitter for FullRandom<R> {
    fn jitter(&self, duration: Duration) -> Result<Duration, JitterError> {
        let upper = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        if upper == 0 {
            return Err(JitterError::EmptyRange);
        }

        let mut rng = self.rng.borrow_mut();
        let rng = rng.get_or_insert_with(|| R::seed_from_u64(clock_seed()));

        Ok(Duration::from_nanos(rng.random_range(0..upper)))
    }
}

/// Creates a [`FullRandom`] jitter with a lazily seeded generator.
pub fn full_random() -> FullRandom {
    FullRandom::new()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_nanos() as u64)
        .unwrap_or_default()
}
