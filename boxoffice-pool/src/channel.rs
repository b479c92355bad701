//! Channel backend: a bounded blocking channel plus a stats mutex.
//!
//! The capacity-bounded channel supplies the blocking full/empty semantics
//! natively: sends block while the channel is full, receives block while it
//! is empty, and FIFO order and thread-safety of the contents come from the
//! channel itself, with no explicit locking here. The channel knows nothing
//! about counters, revenue, version, or the log, so that side-state lives
//! under its own lightweight mutex.
//!
//! Bookkeeping is applied under the stats mutex immediately after the
//! channel call succeeds. Between those two steps the channel's occupancy
//! is briefly visible ahead of the matching counter update; aggregate
//! invariants (`added == purchased + size`) hold at every quiescent point.

use boxoffice_core::{Result, Ticket};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::Mutex;

use crate::cancel::{CancelToken, WAIT_TICK};
use crate::stats::{Blocked, StatsLog};
use crate::TicketPool;

const LABEL: &str = "Channel";

/// Ticket pool whose blocking semantics are delegated to a bounded channel.
#[derive(Debug)]
pub struct ChannelPool {
    capacity: usize,
    tx: Sender<Ticket>,
    rx: Receiver<Ticket>,
    stats: Mutex<StatsLog>,
}

impl ChannelPool {
    /// Create a pool with the given fixed capacity.
    ///
    /// Returns [`boxoffice_core::Error::InvalidCapacity`] if `capacity` is
    /// zero (a zero-capacity channel would rendezvous instead of buffer).
    pub fn new(capacity: usize) -> Result<Self> {
        crate::validate_capacity(capacity)?;
        let (tx, rx) = bounded(capacity);
        Ok(Self {
            capacity,
            tx,
            rx,
            stats: Mutex::new(StatsLog::new()),
        })
    }
}

impl TicketPool for ChannelPool {
    fn add_ticket(&self, ticket: Ticket, cancel: &CancelToken) -> bool {
        // The send consumes the ticket; keep a copy for the bookkeeping
        // that follows a successful transfer.
        let receipt = ticket.clone();
        let mut pending = ticket;
        let mut logged_wait = false;
        if self.tx.is_full() {
            self.stats.lock().record_wait(Blocked::Full);
            logged_wait = true;
        }
        loop {
            match self.tx.send_timeout(pending, WAIT_TICK) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(t)) => {
                    if !logged_wait {
                        self.stats.lock().record_wait(Blocked::Full);
                        logged_wait = true;
                    }
                    if cancel.is_cancelled() {
                        self.stats.lock().record_interrupted(Blocked::Full);
                        return false;
                    }
                    pending = t;
                }
                // The pool owns both endpoints; the channel cannot
                // disconnect while it is alive.
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
        self.stats.lock().record_added(&receipt);
        true
    }

    fn purchase_ticket(&self, cancel: &CancelToken) -> Option<Ticket> {
        let mut logged_wait = false;
        if self.rx.is_empty() {
            self.stats.lock().record_wait(Blocked::Empty);
            logged_wait = true;
        }
        loop {
            match self.rx.recv_timeout(WAIT_TICK) {
                Ok(ticket) => {
                    self.stats.lock().record_purchased(&ticket);
                    return Some(ticket);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !logged_wait {
                        self.stats.lock().record_wait(Blocked::Empty);
                        logged_wait = true;
                    }
                    if cancel.is_cancelled() {
                        self.stats.lock().record_interrupted(Blocked::Empty);
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn perform_exclusive_update(&self) {
        self.stats.lock().record_update();
    }

    fn available_tickets(&self) -> u64 {
        self.rx.len() as u64
    }

    fn added_tickets(&self) -> u64 {
        self.stats.lock().added()
    }

    fn purchased_tickets(&self) -> u64 {
        self.stats.lock().purchased()
    }

    fn version(&self) -> u64 {
        self.stats.lock().version()
    }

    fn total_revenue(&self) -> f64 {
        self.stats.lock().total_revenue()
    }

    fn total_unsold_value(&self) -> f64 {
        self.stats.lock().total_unsold_value()
    }

    fn stats(&self) -> crate::PoolStats {
        self.stats.lock().snapshot(self.rx.len(), self.capacity)
    }

    fn pool_info(&self) -> String {
        self.stats.lock().pool_info(LABEL, self.rx.len(), self.capacity)
    }

    fn logs(&self) -> String {
        self.stats.lock().logs_joined()
    }

    fn log_reader_message(&self, msg: &str) {
        self.stats.lock().record_message(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, price: f64) -> Ticket {
        Ticket::new(id, "Event", price).unwrap()
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(ChannelPool::new(0).is_err());
    }

    #[test]
    fn test_fifo_order() {
        let pool = ChannelPool::new(5).unwrap();
        let cancel = CancelToken::new();

        for id in ["a", "b", "c"] {
            pool.add_ticket(ticket(id, 10.0), &cancel);
        }
        for id in ["a", "b", "c"] {
            assert_eq!(pool.purchase_ticket(&cancel).unwrap().id(), id);
        }
    }

    #[test]
    fn test_revenue_and_unsold() {
        let pool = ChannelPool::new(5).unwrap();
        let cancel = CancelToken::new();

        for (id, price) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
            pool.add_ticket(ticket(id, price), &cancel);
        }
        pool.purchase_ticket(&cancel).unwrap();

        assert_eq!(pool.total_revenue(), 10.0);
        assert_eq!(pool.total_unsold_value(), 50.0);
    }

    #[test]
    fn test_pool_info() {
        let pool = ChannelPool::new(3).unwrap();
        let cancel = CancelToken::new();
        pool.add_ticket(ticket("a", 10.0), &cancel);
        pool.perform_exclusive_update();

        assert_eq!(
            pool.pool_info(),
            "[Channel] Tickets left : 1/3, Added: 1, Purchased: 0, Version: 1"
        );
    }

    #[test]
    fn test_version_updates_are_serialized() {
        let pool = ChannelPool::new(3).unwrap();
        for _ in 0..10 {
            pool.perform_exclusive_update();
        }
        assert_eq!(pool.version(), 10);
    }
}
