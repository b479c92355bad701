//! Boxoffice Core - Value types for the boxoffice ticket pool.
//!
//! This crate provides the types shared by every pool backend:
//!
//! - [`ticket`] - The immutable ticket value (the unit moved through a pool)
//! - [`error`] - Construction-time errors
//!
//! # Example
//!
//! ```rust
//! use boxoffice_core::Ticket;
//!
//! let ticket = Ticket::new("producer-1-42", "Event", 100.0).unwrap();
//! assert_eq!(
//!     ticket.to_string(),
//!     "Ticket{id='producer-1-42', event='Event', price=100.00}"
//! );
//! ```

pub mod error;
pub mod ticket;

// Re-exports for convenience
pub use error::{Error, Result};
pub use ticket::Ticket;
