//! Parking ticket model
//!
//! A ticket records one vehicle's stay from entry to settlement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ticket status
///
/// The only transition is `Open -> Closed`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Vehicle is inside the lot, no charge settled yet
    #[default]
    Open,
    /// Ticket has been settled and its charge is final
    Closed,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }

    /// Parse from string
    ///
    /// Accepts the legacy `in`/`out` labels alongside `open`/`closed`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" | "in" => Some(TicketStatus::Open),
            "closed" | "out" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    /// Check if the ticket has been settled
    pub fn is_final(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

/// Parking ticket entity
///
/// Lifecycle:
/// 1. Issued on vehicle entry (Open, charge 0)
/// 2. Settled on exit (Closed, charge and exit time fixed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier (random 128-bit UUID)
    pub id: Uuid,

    /// Vehicle plate as supplied by the caller
    pub plate: String,

    /// Parking lot identifier
    pub lot: i32,

    /// When the vehicle entered
    pub entry_time: DateTime<Utc>,

    /// Current status
    pub status: TicketStatus,

    /// Settled charge, zero while open
    pub charge: Decimal,

    /// When the ticket was settled
    pub exit_time: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Issue a new open ticket
    pub fn new(id: Uuid, plate: impl Into<String>, lot: i32, entry_time: DateTime<Utc>) -> Self {
        Self {
            id,
            plate: plate.into(),
            lot,
            entry_time,
            status: TicketStatus::Open,
            charge: Decimal::ZERO,
            exit_time: None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        !self.status.is_final()
    }

    /// Return a settled copy of this ticket
    ///
    /// The receiver is left untouched so a failed write never exposes a
    /// half-settled ticket. Negative charges are clamped to zero.
    pub fn settled(&self, charge: Decimal, exit_time: DateTime<Utc>) -> Self {
        Self {
            status: TicketStatus::Closed,
            charge: charge.max(Decimal::ZERO),
            exit_time: Some(exit_time),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sample() -> Ticket {
        Ticket::new(Uuid::new_v4(), "ABC-123", 5, Utc::now())
    }

    #[test]
    fn test_new_ticket_is_open() {
        let ticket = sample();
        assert!(ticket.is_open());
        assert_eq!(ticket.charge, Decimal::ZERO);
        assert_eq!(ticket.exit_time, None);
        assert_eq!(ticket.plate, "ABC-123");
        assert_eq!(ticket.lot, 5);
    }

    #[test]
    fn test_settled_copy() {
        let ticket = sample();
        let exit = ticket.entry_time + Duration::minutes(50);
        let settled = ticket.settled(dec!(10.00), exit);

        assert_eq!(settled.status, TicketStatus::Closed);
        assert_eq!(settled.charge, dec!(10.00));
        assert_eq!(settled.exit_time, Some(exit));
        assert_eq!(settled.id, ticket.id);
        assert_eq!(settled.entry_time, ticket.entry_time);
        assert!(!settled.is_open());

        // Original untouched
        assert!(ticket.is_open());
        assert_eq!(ticket.charge, Decimal::ZERO);
    }

    #[test]
    fn test_settled_never_negative() {
        let ticket = sample();
        let settled = ticket.settled(dec!(-1.00), Utc::now());
        assert_eq!(settled.charge, Decimal::ZERO);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TicketStatus::parse("open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::parse("CLOSED"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::parse("in"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::parse("out"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::parse("parked"), None);
        assert!(TicketStatus::Closed.is_final());
        assert!(!TicketStatus::Open.is_final());
        assert_eq!(TicketStatus::Open.to_string(), "open");
    }
}
