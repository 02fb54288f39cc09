//! Domain models for Tollgate
//!
//! A parking session is represented by a single entity, the `Ticket`.

pub mod ticket;

pub use ticket::{Ticket, TicketStatus};
