//! Bounded thread-safe ticket pool with interchangeable synchronization
//! backends.
//!
//! This crate provides the pool contract and three behaviorally-equivalent
//! implementations:
//! - Monitor backend (single mutex + condition, broadcast wakeups)
//! - Read/write-lock backend (concurrent readers, targeted conditions)
//! - Channel backend (bounded blocking channel + stats mutex)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Role loops                          │
//! │  (producer / consumer / writer / reader, one thread     │
//! │   each, fixed rate, stopped via CancelToken)            │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                 TicketPool contract                     │
//! │  (blocking add/purchase, exclusive update, consistent   │
//! │   aggregate reads, append-only log)                     │
//! └─────────────────────────────────────────────────────────┘
//!            │                │                 │
//!            ▼                ▼                 ▼
//! ┌───────────────┐ ┌────────────────┐ ┌────────────────┐
//! │  MonitorPool  │ │   RwLockPool   │ │  ChannelPool   │
//! │ (one mutex +  │ │ (rw lock, two  │ │ (bounded chan  │
//! │  one condvar) │ │  conditions)   │ │  + stats lock) │
//! └───────────────┘ └────────────────┘ └────────────────┘
//! ```
//!
//! Every backend embeds the same stats/log component, so the observable
//! counters, log action texts, and pool-info line are identical across
//! backends aside from the backend label.

use std::sync::Arc;

use boxoffice_core::{Result, Ticket};

mod cancel;
mod channel;
mod monitor;
mod roles;
mod rwlock;
mod stats;

pub use cancel::{CancelToken, WAIT_TICK};
pub use channel::ChannelPool;
pub use monitor::MonitorPool;
pub use roles::{spawn_consumer, spawn_producer, spawn_reader, spawn_writer, RoleHandle};
pub use rwlock::RwLockPool;
pub use stats::{Blocked, PoolStats, StatsLog};

/// The pool contract, uniform across all backends.
///
/// Blocking conditions (pool full, pool empty) are not errors: `add_ticket`
/// and `purchase_ticket` wait until the condition clears or the supplied
/// [`CancelToken`] is cancelled. A cancelled wait reports "not performed"
/// (`false` / `None`) and leaves the pool exactly as if the call had never
/// started. The remaining operations never block beyond lock acquisition.
pub trait TicketPool: Send + Sync {
    /// Insert a ticket, blocking while the pool is full.
    ///
    /// Returns `true` once the ticket is inserted, `false` if `cancel` was
    /// cancelled while waiting (no mutation in that case). A ticket is
    /// never silently dropped.
    fn add_ticket(&self, ticket: Ticket, cancel: &CancelToken) -> bool;

    /// Remove and return the oldest ticket, blocking while the pool is
    /// empty.
    ///
    /// Returns `None` if `cancel` was cancelled while waiting (no mutation
    /// in that case).
    fn purchase_ticket(&self, cancel: &CancelToken) -> Option<Ticket>;

    /// Bump the version counter. Serialized with insert/remove; concurrent
    /// callers never produce the same resulting version.
    fn perform_exclusive_update(&self);

    /// Number of tickets currently in the pool.
    fn available_tickets(&self) -> u64;

    /// Tickets ever added.
    fn added_tickets(&self) -> u64;

    /// Tickets ever purchased.
    fn purchased_tickets(&self) -> u64;

    /// Current exclusive-update version.
    fn version(&self) -> u64;

    /// Sum of prices of all purchased tickets.
    fn total_revenue(&self) -> f64;

    /// Sum of prices of tickets currently in the pool.
    fn total_unsold_value(&self) -> f64;

    /// All aggregates in one consistent snapshot.
    fn stats(&self) -> PoolStats;

    /// One-line human-readable snapshot:
    /// `[<Label>] Tickets left : <size>/<capacity>, Added: <added>, Purchased: <purchased>, Version: <version>`.
    fn pool_info(&self) -> String;

    /// Newline-joined snapshot of the diagnostic log, insertion order.
    fn logs(&self) -> String;

    /// Append an observer-supplied log line without touching any counters.
    fn log_reader_message(&self, msg: &str);
}

/// Selects one of the three pool backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolBackend {
    /// Single mutex + single condition variable, broadcast wakeups.
    Monitor,
    /// Read/write lock with targeted "not full"/"not empty" conditions.
    RwLock,
    /// Bounded blocking channel plus a stats mutex.
    Channel,
}

impl PoolBackend {
    /// The label used in `pool_info()` output.
    pub fn label(self) -> &'static str {
        match self {
            PoolBackend::Monitor => "Monitor",
            PoolBackend::RwLock => "RwLock",
            PoolBackend::Channel => "Channel",
        }
    }

    /// Build a pool with this backend.
    ///
    /// Returns [`boxoffice_core::Error::InvalidCapacity`] if `capacity` is
    /// zero.
    pub fn build(self, capacity: usize) -> Result<Arc<dyn TicketPool>> {
        let pool: Arc<dyn TicketPool> = match self {
            PoolBackend::Monitor => Arc::new(MonitorPool::new(capacity)?),
            PoolBackend::RwLock => Arc::new(RwLockPool::new(capacity)?),
            PoolBackend::Channel => Arc::new(ChannelPool::new(capacity)?),
        };
        tracing::debug!(backend = self.label(), capacity, "ticket pool created");
        Ok(pool)
    }

    /// All backends, for tests and benchmarks that iterate over them.
    pub fn all() -> [PoolBackend; 3] {
        [PoolBackend::Monitor, PoolBackend::RwLock, PoolBackend::Channel]
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(boxoffice_core::Error::InvalidCapacity(capacity));
    }
    Ok(())
}
