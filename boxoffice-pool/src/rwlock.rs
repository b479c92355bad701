//! Read/write-lock backend: concurrent readers, targeted wakeups.
//!
//! State lives under a `parking_lot::RwLock`. Getters take the read side,
//! so any number of observers can snapshot statistics concurrently while
//! mutations hold the write side exclusively. Two conditions, "not full"
//! and "not empty", let each mutation wake only the waiters that can make
//! progress: an insert signals only ticket-waiters, a purchase signals
//! only space-waiters.
//!
//! # Fairness
//!
//! parking_lot locks use an eventual-fairness policy: parked writers are
//! not perpetually starved by a stream of new readers, and parked threads
//! are woken approximately in arrival order. Strict FIFO hand-off is not
//! guaranteed.
//!
//! # Waiting
//!
//! parking_lot conditions pair with a `Mutex`, not an `RwLock`, so waiters
//! park on a companion mutex that guards no data. The hand-off between
//! dropping the write lock and parking is therefore not atomic; waits are
//! bounded to [`WAIT_TICK`] and re-check the predicate, so a signal lost in
//! that window costs at most one tick. The same tick doubles as the
//! cancellation check interval.

use std::collections::VecDeque;

use boxoffice_core::{Result, Ticket};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::cancel::{CancelToken, WAIT_TICK};
use crate::stats::{Blocked, StatsLog};
use crate::TicketPool;

const LABEL: &str = "RwLock";

#[derive(Debug)]
struct Inner {
    tickets: VecDeque<Ticket>,
    stats: StatsLog,
}

/// Ticket pool with a read path for getters and targeted wait conditions
/// for the two blocking operations.
#[derive(Debug)]
pub struct RwLockPool {
    capacity: usize,
    state: RwLock<Inner>,
    /// Companion lock the conditions park on; guards no data.
    gate: Mutex<()>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl RwLockPool {
    /// Create a pool with the given fixed capacity.
    ///
    /// Returns [`boxoffice_core::Error::InvalidCapacity`] if `capacity` is
    /// zero.
    pub fn new(capacity: usize) -> Result<Self> {
        crate::validate_capacity(capacity)?;
        Ok(Self {
            capacity,
            state: RwLock::new(Inner {
                tickets: VecDeque::with_capacity(capacity),
                stats: StatsLog::new(),
            }),
            gate: Mutex::new(()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Park on `cond` for at most one tick.
    fn wait_tick(&self, cond: &Condvar) {
        let mut gate = self.gate.lock();
        cond.wait_for(&mut gate, WAIT_TICK);
    }
}

impl TicketPool for RwLockPool {
    fn add_ticket(&self, ticket: Ticket, cancel: &CancelToken) -> bool {
        let mut logged_wait = false;
        loop {
            {
                let mut st = self.state.write();
                if st.tickets.len() < self.capacity {
                    st.stats.record_added(&ticket);
                    st.tickets.push_back(ticket);
                    drop(st);
                    self.not_empty.notify_one();
                    return true;
                }
                if !logged_wait {
                    st.stats.record_wait(Blocked::Full);
                    logged_wait = true;
                }
            }
            self.wait_tick(&self.not_full);
            if cancel.is_cancelled() {
                self.state.write().stats.record_interrupted(Blocked::Full);
                return false;
            }
        }
    }

    fn purchase_ticket(&self, cancel: &CancelToken) -> Option<Ticket> {
        let mut logged_wait = false;
        loop {
            {
                let mut st = self.state.write();
                if let Some(ticket) = st.tickets.pop_front() {
                    st.stats.record_purchased(&ticket);
                    drop(st);
                    self.not_full.notify_one();
                    return Some(ticket);
                }
                if !logged_wait {
                    st.stats.record_wait(Blocked::Empty);
                    logged_wait = true;
                }
            }
            self.wait_tick(&self.not_empty);
            if cancel.is_cancelled() {
                self.state.write().stats.record_interrupted(Blocked::Empty);
                return None;
            }
        }
    }

    fn perform_exclusive_update(&self) {
        self.state.write().stats.record_update();
    }

    fn available_tickets(&self) -> u64 {
        self.state.read().tickets.len() as u64
    }

    fn added_tickets(&self) -> u64 {
        self.state.read().stats.added()
    }

    fn purchased_tickets(&self) -> u64 {
        self.state.read().stats.purchased()
    }

    fn version(&self) -> u64 {
        self.state.read().stats.version()
    }

    fn total_revenue(&self) -> f64 {
        self.state.read().stats.total_revenue()
    }

    fn total_unsold_value(&self) -> f64 {
        self.state.read().stats.total_unsold_value()
    }

    fn stats(&self) -> crate::PoolStats {
        let st = self.state.read();
        st.stats.snapshot(st.tickets.len(), self.capacity)
    }

    fn pool_info(&self) -> String {
        let st = self.state.read();
        st.stats.pool_info(LABEL, st.tickets.len(), self.capacity)
    }

    fn logs(&self) -> String {
        self.state.read().stats.logs_joined()
    }

    fn log_reader_message(&self, msg: &str) {
        self.state.write().stats.record_message(msg);
    }
}
