//! Ticket value type.
//!
//! A ticket is the atomic unit moved through a pool. It is immutable once
//! constructed and has exactly one owner at a time: the producer that built
//! it, then the pool that holds it, then the consumer that purchased it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An immutable ticket: identifier, event label, and price.
///
/// Identifiers are caller-supplied and not required to be unique; the pool
/// never inspects them. The price must be finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    id: String,
    event_name: String,
    price: f64,
}

impl Ticket {
    /// Create a new ticket.
    ///
    /// Returns [`Error::InvalidPrice`] if `price` is negative, NaN, or
    /// infinite.
    pub fn new(id: impl Into<String>, event_name: impl Into<String>, price: f64) -> Result<Self> {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidPrice(price));
        }
        Ok(Self {
            id: id.into(),
            event_name: event_name.into(),
            price,
        })
    }

    /// The caller-supplied identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The event this ticket admits to.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// The ticket price.
    pub fn price(&self) -> f64 {
        self.price
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ticket{{id='{}', event='{}', price={:.2}}}",
            self.id, self.event_name, self.price
        )
    }
}
