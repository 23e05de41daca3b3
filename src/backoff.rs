//! Backoff algorithms: pure functions from an attempt number to a wait.
//!
//! A [`BackoffAlgorithm`] never sleeps and never randomizes; it only shapes the
//! curve. Sleeping is done by the [`backoff`](crate::strategy::backoff)
//! strategy and randomization by a [`Jitter`](crate::jitter::Jitter).
//!
//! | Algorithm                         | Wait at attempt `n`          |
//! |-----------------------------------|------------------------------|
//! | [`incremental(i, s)`](incremental) | `i + s * n`                 |
//! | [`linear(f)`](linear)             | `f * n`                      |
//! | [`exponential(f, b)`](exponential) | `f * b^n`                   |
//! | [`binary_exponential(f)`](binary_exponential) | `f * 2^n`       |
//! | [`fibonacci(f)`](fibonacci)       | `f * fib(n)`                 |
//!
//! All arithmetic saturates at [`Duration::MAX`].
//!
//! # Examples
//!
//! ```rust
//! use reattempt::backoff::{incremental, BackoffAlgorithm};
//! use std::time::Duration;
//!
//! let algorithm = incremental(Duration::from_millis(15), Duration::from_millis(10));
//!
//! assert_eq!(algorithm.backoff(1), Duration::from_millis(25));
//! assert_eq!(algorithm.backoff(5), Duration::from_millis(65));
//! ```

use std::time::Duration;

/// Calculates how long to wait before a given attempt.
///
/// Implementations must be deterministic: the same attempt always yields the
/// same duration. Any `Fn(u32) -> Duration` closure is a backoff algorithm.
pub trait BackoffAlgorithm {
    /// The base wait before `attempt`.
    fn backoff(&self, attempt: u32) -> Duration;
}

impl<F> BackoffAlgorithm for F
where
    F: Fn(u32) -> Duration,
{
    fn backoff(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// `initial + increment * attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incremental {
    /// Wait at attempt 0.
    pub initial: Duration,
    /// Added per attempt.
    pub increment: Duration,
}

/// `factor * attempt`. Zero at attempt 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Linear {
    /// Wait per attempt.
    pub factor: Duration,
}

/// `factor * base^attempt`.
///
/// Results that are negative or not a number (a negative or NaN `base`) clamp
/// to [`Duration::ZERO`]; results too large to represent saturate at
/// [`Duration::MAX`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exponential {
    /// Wait at attempt 0.
    pub factor: Duration,
    /// Growth per attempt, usually `>= 1.0`.
    pub base: f64,
}

/// `factor * fib(attempt)`, with `fib(0) = 0` and `fib(1) = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fibonacci {
    /// Multiplied by the Fibonacci number of the attempt.
    pub factor: Duration,
}

/// Creates an [`Incremental`] algorithm.
pub fn incremental(initial: Duration, increment: Duration) -> Incremental {
    Incremental { initial, increment }
}

/// Creates a [`Linear`] algorithm.
///
/// # Examples
///
/// ```rust
/// use reattempt::backoff::{linear, BackoffAlgorithm};
/// use std::time::Duration;
///
/// let algorithm = linear(Duration::from_millis(15));
///
/// assert_eq!(algorithm.backoff(0), Duration::ZERO);
/// assert_eq!(algorithm.backoff(3), Duration::from_millis(45));
/// ```
pub fn linear(factor: Duration) -> Linear {
    Linear { factor }
}

/// Creates an [`Exponential`] algorithm.
///
/// # Examples
///
/// ```rust
/// use reattempt::backoff::{exponential, BackoffAlgorithm};
/// use std::time::Duration;
///
/// let algorithm = exponential(Duration::from_millis(15), 3.0);
///
/// assert_eq!(algorithm.backoff(0), Duration::from_millis(15));
/// assert_eq!(algorithm.backoff(4), Duration::from_millis(1215));
/// ```
pub fn exponential(factor: Duration, base: f64) -> Exponential {
    Exponential { factor, base }
}

/// Creates an [`Exponential`] algorithm with a base of 2.
pub fn binary_exponential(factor: Duration) -> Exponential {
    exponential(factor, 2.0)
}

/// Creates a [`Fibonacci`] algorithm.
///
/// # Examples
///
/// ```rust
/// use reattempt::backoff::{fibonacci, BackoffAlgorithm};
/// use std::time::Duration;
///
/// let algorithm = fibonacci(Duration::from_millis(15));
///
/// // 15ms, 15ms, 30ms, 45ms, 75ms
/// assert_eq!(algorithm.backoff(1), Duration::from_millis(15));
/// assert_eq!(algorithm.backoff(5), Duration::from_millis(75));
/// ```
pub fn fibonacci(factor: Duration) -> Fibonacci {
    Fibonacci { factor }
}

impl BackoffAlgorithm for Incremental {
    fn backoff(&self, attempt: u32) -> Duration {
        self.initial
            .saturating_add(scale(self.increment, u64::from(attempt)))
    }
}

impl BackoffAlgorithm for Linear {
    fn backoff(&self, attempt: u32) -> Duration {
        scale(self.factor, u64::from(attempt))
    }
}

impl BackoffAlgorithm for Exponential {
    fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = match i32::try_from(attempt) {
            Ok(n) => self.base.powi(n),
            Err(_) => self.base.powf(f64::from(attempt)),
        };
        let nanos = self.factor.as_nanos() as f64 * multiplier;

        if nanos.is_nan() || nanos < 0.0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                base = self.base,
                "exponential backoff produced {}, clamping to zero",
                nanos
            );
            return Duration::ZERO;
        }

        from_nanos_saturating(nanos.round() as u128)
    }
}

impl BackoffAlgorithm for Fibonacci {
    fn backoff(&self, attempt: u32) -> Duration {
        scale(self.factor, fibonacci_number(attempt))
    }
}

/// The `n`th Fibonacci number, saturating at `u64::MAX`.
fn fibonacci_number(n: u32) -> u64 {
    // fib(93) is the largest that fits in a u64.
    if n > 93 {
        return u64::MAX;
    }

    let mut a = 0u64;
    let mut b = 1u64;
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

fn scale(duration: Duration, by: u64) -> Duration {
    from_nanos_saturating(duration.as_nanos().saturating_mul(u128::from(by)))
}

// `as` casts from f64 to u128 already saturate, so only the seconds can overflow.
fn from_nanos_saturating(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
