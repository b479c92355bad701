//! Cooperative cancellation for blocked pool operations.
//!
//! A blocked `add_ticket`/`purchase_ticket` call cannot be interrupted from
//! the outside; instead it re-checks a [`CancelToken`] on a bounded tick and
//! returns a "not performed" result when the token has been cancelled. Role
//! loops use the same token to end their run loop and to cut sleeps short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often a blocked wait re-checks its cancel token.
///
/// This bounds the delay between cancelling a token and the blocked call
/// returning. It also bounds the cost of a condition signal that races a
/// waiter into its park (the waiter re-checks the predicate on the next
/// tick).
pub const WAIT_TICK: Duration = Duration::from_millis(50);

/// A cloneable stop flag shared between a role thread and its controller.
///
/// Cancelling a token affects only the calls that were handed that token;
/// other threads blocked on the same pool keep waiting.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, waking early if the token is cancelled.
    ///
    /// The sleep is sliced into [`WAIT_TICK`] intervals so a stop request
    /// takes effect within one tick.
    pub fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while !self.is_cancelled() && !remaining.is_zero() {
            let slice = remaining.min(WAIT_TICK);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_to_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_sleep_cut_short_by_cancel() {
        let token = CancelToken::new();
        token.cancel();
        let start = Instant::now();
        token.sleep(Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
