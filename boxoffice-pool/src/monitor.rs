//! Monitor backend: one mutex over the whole pool state, one condition.
//!
//! The classic single-monitor discipline: every operation takes the same
//! lock, blocking operations loop on a re-checked predicate, and every
//! successful mutation broadcasts to *all* waiters. Broadcast is required
//! here: the single shared condition cannot target only space-waiters or
//! only ticket-waiters, so both kinds must wake and re-evaluate.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use boxoffice_core::{Result, Ticket};

use crate::cancel::{CancelToken, WAIT_TICK};
use crate::stats::{Blocked, StatsLog};
use crate::TicketPool;

const LABEL: &str = "Monitor";

#[derive(Debug)]
struct Inner {
    tickets: VecDeque<Ticket>,
    stats: StatsLog,
}

/// Ticket pool protected by a single mutex/condition pair.
#[derive(Debug)]
pub struct MonitorPool {
    capacity: usize,
    inner: Mutex<Inner>,
    cond: Condvar,
}

impl MonitorPool {
    /// Create a pool with the given fixed capacity.
    ///
    /// Returns [`boxoffice_core::Error::InvalidCapacity`] if `capacity` is
    /// zero.
    pub fn new(capacity: usize) -> Result<Self> {
        crate::validate_capacity(capacity)?;
        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                tickets: VecDeque::with_capacity(capacity),
                stats: StatsLog::new(),
            }),
            cond: Condvar::new(),
        })
    }

    // A thread that panics while holding the lock must not wedge every
    // other role thread; the state it guards stays structurally valid, so
    // poisoning is absorbed rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_tick<'a>(&self, guard: MutexGuard<'a, Inner>) -> MutexGuard<'a, Inner> {
        let (guard, _) = self
            .cond
            .wait_timeout(guard, WAIT_TICK)
            .unwrap_or_else(PoisonError::into_inner);
        guard
    }
}

impl TicketPool for MonitorPool {
    fn add_ticket(&self, ticket: Ticket, cancel: &CancelToken) -> bool {
        let mut inner = self.lock();
        let mut logged_wait = false;
        while inner.tickets.len() == self.capacity {
            if !logged_wait {
                inner.stats.record_wait(Blocked::Full);
                logged_wait = true;
            }
            inner = self.wait_tick(inner);
            if cancel.is_cancelled() {
                inner.stats.record_interrupted(Blocked::Full);
                return false;
            }
        }
        inner.stats.record_added(&ticket);
        inner.tickets.push_back(ticket);
        self.cond.notify_all();
        true
    }

    fn purchase_ticket(&self, cancel: &CancelToken) -> Option<Ticket> {
        let mut inner = self.lock();
        let mut logged_wait = false;
        while inner.tickets.is_empty() {
            if !logged_wait {
                inner.stats.record_wait(Blocked::Empty);
                logged_wait = true;
            }
            inner = self.wait_tick(inner);
            if cancel.is_cancelled() {
                inner.stats.record_interrupted(Blocked::Empty);
                return None;
            }
        }
        // Loop guard guarantees a head exists
        let ticket = inner.tickets.pop_front()?;
        inner.stats.record_purchased(&ticket);
        self.cond.notify_all();
        Some(ticket)
    }

    fn perform_exclusive_update(&self) {
        self.lock().stats.record_update();
    }

    fn available_tickets(&self) -> u64 {
        self.lock().tickets.len() as u64
    }

    fn added_tickets(&self) -> u64 {
        self.lock().stats.added()
    }

    fn purchased_tickets(&self) -> u64 {
        self.lock().stats.purchased()
    }

    fn version(&self) -> u64 {
        self.lock().stats.version()
    }

    fn total_revenue(&self) -> f64 {
        self.lock().stats.total_revenue()
    }

    fn total_unsold_value(&self) -> f64 {
        self.lock().stats.total_unsold_value()
    }

    fn stats(&self) -> crate::PoolStats {
        let inner = self.lock();
        inner.stats.snapshot(inner.tickets.len(), self.capacity)
    }

    fn pool_info(&self) -> String {
        let inner = self.lock();
        inner.stats.pool_info(LABEL, inner.tickets.len(), self.capacity)
    }

    fn logs(&self) -> String {
        self.lock().stats.logs_joined()
    }

    fn log_reader_message(&self, msg: &str) {
        self.lock().stats.record_message(msg);
    }
}
