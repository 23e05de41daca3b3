//! Error type for retry loops.

use crate::context::Cancelled;

/// Why a retry loop ended without a success.
///
/// Exactly one reason is reported, never a history of errors.
///
/// # Examples
///
/// ```rust
/// use reattempt::{retry, strategy::limit, RetryError};
///
/// let result = retry(|_attempt| Err::<(), _>("always fails"), &[&limit(2)]);
///
/// match result {
///     Err(RetryError::Failed(err)) => assert_eq!(err, "always fails"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The strategies stopped the loop; this is the action's last error,
    /// unchanged.
    Failed(E),
    /// The context was cancelled. Takes precedence over an action failure.
    Cancelled(Cancelled),
    /// The strategies refused attempt 0, so the action never ran.
    NotAttempted,
}

impl<E> RetryError<E> {
    /// Returns true if the loop stopped because the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns true if this carries an action error.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Get a reference to the action error, if any.
    pub fn failed(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Extract the action error, if any.
    pub fn into_failed(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Get the cancellation reason, if any.
    pub fn cancelled(&self) -> Option<Cancelled> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Transform the action error.
    pub fn map_failed<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Failed(e) => RetryError::Failed(f(e)),
            Self::Cancelled(reason) => RetryError::Cancelled(reason),
            Self::NotAttempted => RetryError::NotAttempted,
        }
    }
}

impl<E> From<Cancelled> for RetryError<E> {
    fn from(reason: Cancelled) -> Self {
        Self::Cancelled(reason)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "{}", e),
            Self::Cancelled(reason) => write!(f, "retry cancelled: {}", reason),
            Self::NotAttempted => write!(f, "retry strategies refused the first attempt"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Cancelled(reason) => Some(reason),
            Self::NotAttempted => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, PartialEq)]
    struct Broken;

    impl std::fmt::Display for Broken {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "broken")
        }
    }

    impl std::error::Error for Broken {}

    #[test]
    fn test_failed_accessors() {
        let err = RetryError::Failed("connection refused");
        assert!(err.is_failed());
        assert!(!err.is_cancelled());
        assert_eq!(err.failed(), Some(&"connection refused"));
        assert_eq!(err.cancelled(), None);
        assert_eq!(err.into_failed(), Some("connection refused"));
    }

    #[test]
    fn test_cancelled_accessors() {
        let err: RetryError<String> = Cancelled::DeadlineExceeded.into();
        assert!(err.is_cancelled());
        assert!(!err.is_failed());
        assert_eq!(err.cancelled(), Some(Cancelled::DeadlineExceeded));
        assert_eq!(err.into_failed(), None);
    }

    #[test]
    fn test_map_failed() {
        let err = RetryError::Failed(3).map_failed(|n| n * 2);
        assert_eq!(err, RetryError::Failed(6));

        let err: RetryError<i32> = RetryError::<i32>::NotAttempted.map_failed(|n| n * 2);
        assert_eq!(err, RetryError::NotAttempted);
    }

    #[test]
    fn test_display() {
        assert_eq!(RetryError::Failed("timeout").to_string(), "timeout");
        assert_eq!(
            RetryError::<&str>::Cancelled(Cancelled::Canceled).to_string(),
            "retry cancelled: context canceled"
        );
        assert!(RetryError::<&str>::NotAttempted
            .to_string()
            .contains("refused the first attempt"));
    }

    #[test]
    fn test_source() {
        let failed = RetryError::Failed(Broken);
        assert_eq!(failed.source().map(|s| s.to_string()), Some("broken".into()));

        let cancelled = RetryError::<Broken>::Cancelled(Cancelled::Canceled);
        assert_eq!(
            cancelled.source().map(|s| s.to_string()),
            Some("context canceled".into())
        );

        assert!(RetryError::<Broken>::NotAttempted.source().is_none());
    }
}
