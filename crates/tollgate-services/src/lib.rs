//! Business logic services for Tollgate
//!
//! This crate owns the parking ticket lifecycle and the fee algorithm.
//!
//! # Architecture
//!
//! - `TicketService` receives its store, clock and id generator through its
//!   constructor, so the same code runs against Redis in production and
//!   against in-memory fakes in tests
//! - Services are shared behind `Arc` across async tasks; they hold no
//!   mutable state of their own
//! - Every store call is bounded by a cancellation token and a timeout
//! - All operations are instrumented with tracing
//!
//! # Modules
//!
//! - `billing` - Time-bucketed fee calculation
//! - `ticket_service` - Open / close / lookup / remove
//! - `testing` - Deterministic clock, id generator and fault-injecting store
//!   for tests (`test-utils` feature)

pub mod billing;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod ticket_service;

pub use billing::{calculate_charge, Charge};
pub use ticket_service::{Settlement, TicketService};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Length of one billing increment in minutes
    pub const INCREMENT_MINUTES: i64 = 15;

    /// Price of one increment (10.00 per hour)
    pub const UNIT_PRICE: Decimal = dec!(2.50);

    /// Stays shorter than this (1 microsecond) are free
    pub const ZERO_CHARGE_THRESHOLD_MINUTES: f64 = 1.0e-6 / 60.0;

    /// Tolerance (1 millisecond) subtracted before rounding up, so a stay of
    /// exactly N increments is not pushed into N + 1 by measurement jitter
    pub const BOUNDARY_EPSILON_MINUTES: f64 = 0.001 / 60.0;

    /// Default upper bound for a single store call
    pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;
}
