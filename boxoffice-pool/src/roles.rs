//! Fixed-rate role loops driving a pool through its public contract.
//!
//! Each role runs on its own OS thread: perform one pool operation, sleep
//! `1000 / rate` milliseconds, repeat until stopped. Roles own no pool
//! state; they only call the [`TicketPool`] contract:
//!
//! - producer: `add_ticket` with a fixed price per instance
//! - consumer: `purchase_ticket`, discarding the result
//! - writer: `perform_exclusive_update`
//! - reader: `pool_info` then `log_reader_message("reads from " + info)`
//!
//! Stopping a role cancels its token (which also unblocks a wait in
//! progress) and joins the thread. One role's stop never affects another
//! role's ability to proceed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use boxoffice_core::{Error, Result, Ticket};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::TicketPool;

/// Event label producers stamp on every ticket.
const EVENT_NAME: &str = "Event";

// Per-role sequence numbers, used only for thread naming.
static PRODUCER_SEQ: AtomicU64 = AtomicU64::new(0);
static CONSUMER_SEQ: AtomicU64 = AtomicU64::new(0);
static WRITER_SEQ: AtomicU64 = AtomicU64::new(0);
static READER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Handle to a running role thread.
#[derive(Debug)]
pub struct RoleHandle {
    name: String,
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

impl RoleHandle {
    /// The role thread's name (e.g. `producer-1`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token this role's blocking calls were handed.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Stop the role: cancel its token and join the thread.
    ///
    /// A wait in progress returns within one cancellation tick, so the join
    /// completes within a bounded short delay.
    pub fn stop(self) {
        self.cancel.cancel();
        let _ = self.thread.join();
        debug!(role = %self.name, "role stopped");
    }
}

fn interval_for(rate: u32) -> Result<Duration> {
    if rate == 0 {
        return Err(Error::InvalidRate(rate));
    }
    Ok(Duration::from_millis(1000 / u64::from(rate)))
}

fn spawn_role<F>(name: String, body: F) -> Result<RoleHandle>
where
    F: FnOnce(CancelToken) + Send + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let thread = thread::Builder::new()
        .name(name.clone())
        .spawn(move || body(token))?;
    Ok(RoleHandle {
        name,
        cancel,
        thread,
    })
}

/// Spawn a producer inserting one ticket per interval at a fixed price.
///
/// Ticket ids are `[<thread-name>]-<n>` with `n` counting from 1.
pub fn spawn_producer(
    pool: Arc<dyn TicketPool>,
    rate: u32,
    price: f64,
) -> Result<RoleHandle> {
    let interval = interval_for(rate)?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice(price));
    }
    let seq = PRODUCER_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    let name = format!("producer-{seq}");
    info!(role = %name, rate, price, "starting producer");
    spawn_role(name.clone(), move |cancel| {
        let mut count = 0u64;
        while !cancel.is_cancelled() {
            count += 1;
            // Price was validated at spawn, so construction cannot fail.
            let Ok(ticket) = Ticket::new(format!("[{name}]-{count}"), EVENT_NAME, price) else {
                break;
            };
            pool.add_ticket(ticket, &cancel);
            cancel.sleep(interval);
        }
    })
}

/// Spawn a consumer purchasing (and discarding) one ticket per interval.
pub fn spawn_consumer(pool: Arc<dyn TicketPool>, rate: u32) -> Result<RoleHandle> {
    let interval = interval_for(rate)?;
    let seq = CONSUMER_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    let name = format!("consumer-{seq}");
    info!(role = %name, rate, "starting consumer");
    spawn_role(name, move |cancel| {
        while !cancel.is_cancelled() {
            let _ = pool.purchase_ticket(&cancel);
            cancel.sleep(interval);
        }
    })
}

/// Spawn a writer performing one exclusive update per interval.
pub fn spawn_writer(pool: Arc<dyn TicketPool>, rate: u32) -> Result<RoleHandle> {
    let interval = interval_for(rate)?;
    let seq = WRITER_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    let name = format!("writer-{seq}");
    info!(role = %name, rate, "starting writer");
    spawn_role(name, move |cancel| {
        while !cancel.is_cancelled() {
            pool.perform_exclusive_update();
            cancel.sleep(interval);
        }
    })
}

/// Spawn a read-only observer that snapshots the pool once per interval and
/// appends what it saw to the pool's log.
pub fn spawn_reader(pool: Arc<dyn TicketPool>, rate: u32) -> Result<RoleHandle> {
    let interval = interval_for(rate)?;
    let seq = READER_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    let name = format!("reader-{seq}");
    info!(role = %name, rate, "starting reader");
    spawn_role(name, move |cancel| {
        while !cancel.is_cancelled() {
            let info = pool.pool_info();
            pool.log_reader_message(&format!("reads from {info}"));
            cancel.sleep(interval);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PoolBackend;

    #[test]
    fn test_rejects_zero_rate() {
        let pool = PoolBackend::Monitor.build(5).unwrap();
        assert!(spawn_producer(Arc::clone(&pool), 0, 10.0).is_err());
        assert!(spawn_consumer(pool, 0).is_err());
    }

    #[test]
    fn test_rejects_bad_price() {
        let pool = PoolBackend::Monitor.build(5).unwrap();
        assert!(spawn_producer(pool, 10, -1.0).is_err());
    }

    #[test]
    fn test_producer_consumer_round_trip() {
        let pool = PoolBackend::Monitor.build(5).unwrap();

        let producer = spawn_producer(Arc::clone(&pool), 100, 25.0).unwrap();
        let consumer = spawn_consumer(Arc::clone(&pool), 100).unwrap();

        std::thread::sleep(Duration::from_millis(300));
        producer.stop();
        consumer.stop();

        let added = pool.added_tickets();
        let purchased = pool.purchased_tickets();
        assert!(added > 0, "producer should have inserted tickets");
        assert_eq!(added, purchased + pool.available_tickets());
    }

    #[test]
    fn test_reader_appends_observations() {
        let pool = PoolBackend::RwLock.build(5).unwrap();

        let reader = spawn_reader(Arc::clone(&pool), 100).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        reader.stop();

        assert!(pool.logs().contains("reads from [RwLock] Tickets left :"));
        // Observers never touch counters
        assert_eq!(pool.added_tickets(), 0);
        assert_eq!(pool.version(), 0);
    }

    #[test]
    fn test_writer_bumps_version() {
        let pool = PoolBackend::Channel.build(5).unwrap();

        let writer = spawn_writer(Arc::clone(&pool), 100).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        writer.stop();

        assert!(pool.version() > 0);
    }
}
