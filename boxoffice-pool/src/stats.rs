//! Pool statistics and the append-only diagnostic log.
//!
//! Every backend embeds one [`StatsLog`] and layers its own synchronization
//! on top: the monitor and read/write-lock backends keep it inside their
//! locked state, the channel backend guards it with a dedicated mutex. The
//! struct itself is plain data, so whichever lock protects it also makes
//! every counter/log mutation atomic with respect to the others.
//!
//! Log entries are timestamped and tagged with the mutating thread's name.
//! Action texts are identical across backends so the same operation script
//! produces the same log on every backend, modulo timestamps and thread
//! tags.

use boxoffice_core::Ticket;
use chrono::Local;

/// Which blocking condition a waiter is parked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    /// `add_ticket` waiting for space.
    Full,
    /// `purchase_ticket` waiting for a ticket.
    Empty,
}

impl Blocked {
    fn state_label(self) -> &'static str {
        match self {
            Blocked::Full => "FULL",
            Blocked::Empty => "EMPTY",
        }
    }

    fn op_label(self) -> &'static str {
        match self {
            Blocked::Full => "add",
            Blocked::Empty => "purchase",
        }
    }
}

/// Point-in-time snapshot of a pool's aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Tickets currently in the pool.
    pub size: u64,
    /// Fixed capacity.
    pub capacity: u64,
    /// Tickets ever added.
    pub added: u64,
    /// Tickets ever purchased.
    pub purchased: u64,
    /// Exclusive-update counter.
    pub version: u64,
    /// Sum of prices of all purchased tickets.
    pub total_revenue: f64,
    /// Sum of prices of tickets currently in the pool.
    pub total_unsold_value: f64,
}

/// Counters, accumulators, and the append-only log embedded in each pool.
///
/// `added` and `purchased` only ever grow; `added - purchased` is the number
/// of tickets currently held. `version` is bumped only by the exclusive
/// update. The log never shrinks during the pool's lifetime.
#[derive(Debug, Default)]
pub struct StatsLog {
    added: u64,
    purchased: u64,
    version: u64,
    total_revenue: f64,
    total_added_value: f64,
    log: Vec<String>,
}

impl StatsLog {
    /// Create an empty stats/log component.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful insert: bump `added`, accumulate the ticket's
    /// price into added-value, append an `Added` log line.
    pub fn record_added(&mut self, ticket: &Ticket) {
        self.added += 1;
        self.total_added_value += ticket.price();
        self.push(format_args!("Added {ticket}"));
    }

    /// Record a successful purchase: bump `purchased`, accumulate revenue,
    /// append a `Purchased` log line.
    pub fn record_purchased(&mut self, ticket: &Ticket) {
        self.purchased += 1;
        self.total_revenue += ticket.price();
        self.push(format_args!("Purchased {ticket}"));
    }

    /// Record an exclusive update. Returns the new version.
    pub fn record_update(&mut self) -> u64 {
        self.version += 1;
        let version = self.version;
        self.push(format_args!("updated version to {version}"));
        version
    }

    /// Record that a thread started waiting on a blocking condition.
    pub fn record_wait(&mut self, on: Blocked) {
        self.push(format_args!("WAIT - Pool {}", on.state_label()));
    }

    /// Record a cancelled wait. The operation performed no mutation.
    pub fn record_interrupted(&mut self, on: Blocked) {
        self.push(format_args!("INTERRUPTED while waiting to {}", on.op_label()));
    }

    /// Append an externally supplied line (observer messages). Counters are
    /// untouched.
    pub fn record_message(&mut self, msg: &str) {
        self.push(format_args!("{msg}"));
    }

    /// Tickets ever added.
    #[inline]
    pub fn added(&self) -> u64 {
        self.added
    }

    /// Tickets ever purchased.
    #[inline]
    pub fn purchased(&self) -> u64 {
        self.purchased
    }

    /// Current exclusive-update version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sum of prices of all purchased tickets.
    #[inline]
    pub fn total_revenue(&self) -> f64 {
        self.total_revenue
    }

    /// Sum of prices of tickets currently held (added value minus revenue).
    #[inline]
    pub fn total_unsold_value(&self) -> f64 {
        self.total_added_value - self.total_revenue
    }

    /// Newline-joined snapshot of the log, insertion order.
    pub fn logs_joined(&self) -> String {
        self.log.join("\n")
    }

    /// The human-readable one-line pool summary.
    pub fn pool_info(&self, label: &str, size: usize, capacity: usize) -> String {
        format!(
            "[{label}] Tickets left : {size}/{capacity}, Added: {added}, Purchased: {purchased}, Version: {version}",
            added = self.added,
            purchased = self.purchased,
            version = self.version,
        )
    }

    /// Snapshot all aggregates at once.
    pub fn snapshot(&self, size: usize, capacity: usize) -> PoolStats {
        PoolStats {
            size: size as u64,
            capacity: capacity as u64,
            added: self.added,
            purchased: self.purchased,
            version: self.version,
            total_revenue: self.total_revenue,
            total_unsold_value: self.total_unsold_value(),
        }
    }

    fn push(&mut self, action: std::fmt::Arguments<'_>) {
        let thread = std::thread::current();
        let tag = thread
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{:?}", thread.id()));
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        self.log.push(format!("{timestamp} [{tag}] {action}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(price: f64) -> Ticket {
        Ticket::new("t-1", "Event", price).unwrap()
    }

    #[test]
    fn test_counters_track_operations() {
        let mut stats = StatsLog::new();
        stats.record_added(&ticket(10.0));
        stats.record_added(&ticket(20.0));
        stats.record_purchased(&ticket(10.0));

        assert_eq!(stats.added(), 2);
        assert_eq!(stats.purchased(), 1);
        assert_eq!(stats.total_revenue(), 10.0);
        assert_eq!(stats.total_unsold_value(), 20.0);
    }

    #[test]
    fn test_version_increments() {
        let mut stats = StatsLog::new();
        assert_eq!(stats.record_update(), 1);
        assert_eq!(stats.record_update(), 2);
        assert_eq!(stats.version(), 2);
    }

    #[test]
    fn test_log_is_append_only() {
        let mut stats = StatsLog::new();
        stats.record_added(&ticket(10.0));
        stats.record_wait(Blocked::Empty);
        stats.record_interrupted(Blocked::Empty);
        stats.record_message("reads from somewhere");

        let logs = stats.logs_joined();
        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("Added Ticket{id='t-1', event='Event', price=10.00}"));
        assert!(lines[1].ends_with("WAIT - Pool EMPTY"));
        assert!(lines[2].ends_with("INTERRUPTED while waiting to purchase"));
        assert!(lines[3].ends_with("reads from somewhere"));
    }

    #[test]
    fn test_pool_info_format() {
        let mut stats = StatsLog::new();
        stats.record_added(&ticket(10.0));
        stats.record_update();

        assert_eq!(
            stats.pool_info("Monitor", 1, 5),
            "[Monitor] Tickets left : 1/5, Added: 1, Purchased: 0, Version: 1"
        );
    }

    #[test]
    fn test_entries_carry_timestamp_and_thread_tag() {
        let mut stats = StatsLog::new();
        stats.record_update();

        let logs = stats.logs_joined();
        // "HH:MM:SS.mmm [tag] action"
        let (timestamp, rest) = logs.split_once(' ').unwrap();
        assert_eq!(timestamp.len(), 12);
        assert!(rest.starts_with('['));
    }
}
