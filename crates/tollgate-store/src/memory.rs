//! In-memory ticket store
//!
//! Backed by a `HashMap` behind a `parking_lot::RwLock`. The lock is never
//! held across an await point, so every operation is atomic per key.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tollgate_core::{models::Ticket, traits::TicketStore, AppError};
use tracing::debug;
use uuid::Uuid;

/// Process-local ticket store
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets
    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn put(&self, ticket: &Ticket) -> Result<(), AppError> {
        debug!("PUT ticket {}", ticket.id);
        self.tickets.write().insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        debug!("GET ticket {}", id);
        Ok(self.tickets.read().get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        debug!("DEL ticket {}", id);
        self.tickets.write().remove(&id);
        Ok(())
    }
}
