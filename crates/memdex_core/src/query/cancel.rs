//! Query cancellation and deadlines.

use crate::error::{CoreError, CoreResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag that asks running queries to stop.
///
/// Clones share the same flag. Cancellation is cooperative: a query
/// checks the token between steps and periodically during scans, so it
/// stops promptly but not instantly. A cancelled query has only read
/// from the store and leaves it untouched.
///
/// # Example
///
/// ```rust
/// use memdex_core::{CancelToken, Store, StoreConfig};
///
/// let store: Store<String> = Store::new(StoreConfig::default());
/// let token = CancelToken::new();
/// token.cancel();
///
/// let err = store.query().execute_with_cancel(&token).unwrap_err();
/// assert!(err.is_interrupted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Checks if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Deadline and cancellation checks for one query execution.
pub(crate) struct Interrupt<'a> {
    cancel: &'a CancelToken,
    timeout: Duration,
    /// `None` when the timeout is too large to represent.
    deadline: Option<Instant>,
}

impl<'a> Interrupt<'a> {
    pub(crate) fn start(cancel: &'a CancelToken, timeout: Duration) -> Self {
        Self {
            cancel,
            timeout,
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Fails if the query was cancelled or ran past its deadline.
    /// Cancellation wins when both apply.
    pub(crate) fn check(&self) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CoreError::DeadlineExceeded {
                timeout: self.timeout,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn zero_timeout_is_already_expired() {
        let token = CancelToken::new();
        let interrupt = Interrupt::start(&token, Duration::ZERO);
        assert_eq!(
            interrupt.check().unwrap_err(),
            CoreError::DeadlineExceeded {
                timeout: Duration::ZERO
            }
        );
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let token = CancelToken::new();
        token.cancel();
        let interrupt = Interrupt::start(&token, Duration::ZERO);
        assert_eq!(interrupt.check().unwrap_err(), CoreError::Cancelled);
    }

    #[test]
    fn unbounded_timeout_never_expires() {
        let token = CancelToken::new();
        let interrupt = Interrupt::start(&token, Duration::MAX);
        assert!(interrupt.check().is_ok());
    }
}
