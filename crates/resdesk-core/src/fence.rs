//! Sequence fencing for list refetches.
//!
//! Two overlapping refetches of the same list can resolve out of order. Each
//! refetch takes a ticket when it starts; its result is applied only if no
//! newer refetch has started since.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issued by [`RefetchFence::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefetchTicket(u64);

#[derive(Debug, Default)]
pub struct RefetchFence {
    latest: AtomicU64,
}

impl RefetchFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refetch, superseding every earlier ticket.
    pub fn begin(&self) -> RefetchTicket {
        RefetchTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RefetchTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Runs `apply` with `value` when `ticket` is still current.
    ///
    /// Returns whether the value was applied.
    pub fn apply<T>(&self, ticket: RefetchTicket, value: T, apply: impl FnOnce(T)) -> bool {
        if self.is_current(ticket) {
            apply(value);
            true
        } else {
            tracing::debug!(ticket = ticket.0, "dropping stale refetch result");
            false
        }
    }
}
