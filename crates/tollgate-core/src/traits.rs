//! Common traits for storage and environment capabilities
//!
//! The services depend only on these abstractions, so they run unchanged
//! against an in-memory store in tests and a networked store in production.

use crate::error::AppError;
use crate::models::Ticket;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Key-value persistence for tickets
///
/// Implementations must make each operation atomic for a single key and must
/// report backend failures as errors rather than as a missing record.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert or fully overwrite the record keyed by `ticket.id`
    async fn put(&self, ticket: &Ticket) -> Result<(), AppError>;

    /// Fetch a ticket, `Ok(None)` when no record exists
    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, AppError>;

    /// Remove a ticket; removing an absent ticket is not an error
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of fresh ticket identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random (v4) UUID generator
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_generator_unique() {
        let ids = UuidV4Generator;
        let issued: HashSet<Uuid> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn test_uuid_generator_version() {
        let id = UuidV4Generator.next_id();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
