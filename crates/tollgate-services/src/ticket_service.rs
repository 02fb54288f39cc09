//! Ticket lifecycle service
//!
//! Issues tickets on entry and settles them on exit:
//! - `open` creates and stores a ticket, returning it even when the write fails
//! - `close` bills the stay and persists the settled ticket
//! - `lookup` reads a ticket without changing it
//! - `remove` deletes a ticket on the caller's request
//!
//! Exit-side failures collapse to "not found" for the caller. Each failure is
//! logged with an `outcome` field carrying the error code, so a storage
//! outage stays distinguishable from an unknown ticket.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tollgate_core::{
    models::Ticket,
    traits::{Clock, IdGenerator, SystemClock, TicketStore, UuidV4Generator},
    AppError, AppResult,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::billing;
use crate::constants::DEFAULT_STORE_TIMEOUT_MS;

/// Outcome of a successful `close`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// The settled ticket as stored
    pub ticket: Ticket,
    /// Length of the stay rounded to the nearest minute
    pub elapsed_minutes: i64,
    /// The ticket was already closed before this call; nothing was written
    pub already_settled: bool,
}

/// Parking ticket service
///
/// Holds only shared references, so one instance can serve concurrent
/// requests. Two simultaneous closes of the same open ticket both bill it and
/// the last write wins.
pub struct TicketService<S: TicketStore + ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    store_timeout: Duration,
}

impl<S: TicketStore + ?Sized> TicketService<S> {
    /// Create a new ticket service
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            clock,
            ids,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }

    /// Create a service using the wall clock and random v4 ids
    pub fn with_system_defaults(store: Arc<S>) -> Self {
        Self::new(store, Arc::new(SystemClock), Arc::new(UuidV4Generator))
    }

    /// Bound every store call by `timeout`
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run a store call under the caller's cancellation token and the
    /// service timeout
    ///
    /// Cancellation is checked first, so an already-cancelled token never
    /// reaches the store.
    async fn bounded<T, F>(&self, cancel: &CancellationToken, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = tokio::time::timeout(self.store_timeout, call) => match result {
                Ok(inner) => inner,
                Err(_) => Err(AppError::Timeout(self.store_timeout.as_millis() as u64)),
            },
        }
    }

    fn parse_id(id: &str) -> AppResult<Uuid> {
        let id = id.trim();
        Uuid::parse_str(id).map_err(|e| AppError::InvalidTicketId(format!("{}: {}", id, e)))
    }

    /// Issue a ticket for a vehicle entering `lot`
    ///
    /// The plate is recorded as given. The ticket is returned even if it
    /// could not be stored: the entry flow stays available during a store
    /// outage, at the cost of that ticket not being retrievable later. Such
    /// failures are logged at error level with `outcome` set.
    #[instrument(skip(self, cancel))]
    pub async fn open(&self, plate: &str, lot: i32, cancel: &CancellationToken) -> Ticket {
        let ticket = Ticket::new(self.ids.next_id(), plate, lot, self.clock.now());

        info!("Issuing ticket {} for plate {} in lot {}", ticket.id, plate, lot);

        match self.bounded(cancel, self.store.put(&ticket)).await {
            Ok(()) => {
                debug!("Stored ticket {}", ticket.id);
            }
            Err(e) => {
                error!(
                    ticket_id = %ticket.id,
                    outcome = e.error_code(),
                    "Ticket {} not persisted, returning it anyway: {}",
                    ticket.id,
                    e
                );
            }
        }

        ticket
    }

    /// Settle a ticket, `None` if it cannot be found or read
    #[instrument(skip(self, cancel))]
    pub async fn close(&self, id: &str, cancel: &CancellationToken) -> Option<Settlement> {
        match self.try_close(id, cancel).await {
            Ok(settlement) => Some(settlement),
            Err(e) => {
                Self::log_failure("close", id, &e);
                None
            }
        }
    }

    /// Settle a ticket, reporting why it could not be settled
    ///
    /// # Errors
    ///
    /// - `InvalidTicketId` / `TicketNotFound` if there is no such ticket
    /// - `StoreUnavailable` / `Timeout` if the store failed on read or write
    /// - `Encoding` if the stored record is unreadable
    /// - `Cancelled` if `cancel` fired first
    ///
    /// A ticket that is already closed is returned as stored, with
    /// `already_settled` set and no write.
    pub async fn try_close(&self, id: &str, cancel: &CancellationToken) -> AppResult<Settlement> {
        let ticket_id = Self::parse_id(id)?;

        let ticket = self
            .bounded(cancel, self.store.get(ticket_id))
            .await?
            .ok_or_else(|| AppError::TicketNotFound(ticket_id.to_string()))?;

        if !ticket.is_open() {
            let elapsed_minutes = ticket
                .exit_time
                .map(|exit| billing::elapsed_minutes(ticket.entry_time, exit))
                .unwrap_or(0);

            info!(
                "Ticket {} already settled: {} min, charge {}",
                ticket.id, elapsed_minutes, ticket.charge
            );

            return Ok(Settlement {
                ticket,
                elapsed_minutes,
                already_settled: true,
            });
        }

        let now = self.clock.now();
        let charge = billing::calculate_charge(ticket.entry_time, now);

        debug!(
            "Ticket {}: {} min, {} increments, charge {}",
            ticket.id, charge.elapsed_minutes, charge.increments, charge.amount
        );

        let settled = ticket.settled(charge.amount, now);
        self.bounded(cancel, self.store.put(&settled)).await?;

        info!(
            "Settled ticket {} (plate {}, lot {}): {} min, charge {}",
            settled.id, settled.plate, settled.lot, charge.elapsed_minutes, settled.charge
        );

        Ok(Settlement {
            ticket: settled,
            elapsed_minutes: charge.elapsed_minutes,
            already_settled: false,
        })
    }

    /// Fetch a ticket without changing it, `None` if it cannot be found or read
    #[instrument(skip(self, cancel))]
    pub async fn lookup(&self, id: &str, cancel: &CancellationToken) -> Option<Ticket> {
        match self.try_lookup(id, cancel).await {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                Self::log_failure("lookup", id, &e);
                None
            }
        }
    }

    /// Fetch a ticket, reporting why it could not be read
    pub async fn try_lookup(&self, id: &str, cancel: &CancellationToken) -> AppResult<Ticket> {
        let ticket_id = Self::parse_id(id)?;

        self.bounded(cancel, self.store.get(ticket_id))
            .await?
            .ok_or_else(|| AppError::TicketNotFound(ticket_id.to_string()))
    }

    /// Delete a ticket
    ///
    /// Never called by the lifecycle itself; retention is the caller's
    /// decision. Removing an unknown ticket succeeds.
    #[instrument(skip(self, cancel))]
    pub async fn remove(&self, id: &str, cancel: &CancellationToken) -> AppResult<()> {
        let ticket_id = Self::parse_id(id)?;

        self.bounded(cancel, self.store.delete(ticket_id))
            .await
            .map_err(|e| {
                Self::log_failure("remove", id, &e);
                e
            })?;

        info!("Removed ticket {}", ticket_id);
        Ok(())
    }

    fn log_failure(operation: &str, id: &str, err: &AppError) {
        let id = id.trim();
        let outcome = err.error_code();
        match err {
            AppError::TicketNotFound(_) | AppError::InvalidTicketId(_) => {
                warn!(ticket_id = id, outcome, "{}: ticket not found: {}", operation, err);
            }
            AppError::Cancelled => {
                warn!(ticket_id = id, outcome, "{}: cancelled by caller", operation);
            }
            AppError::Encoding(_) => {
                error!(ticket_id = id, outcome, "{}: unreadable ticket record: {}", operation, err);
            }
            _ => {
                error!(ticket_id = id, outcome, "{}: ticket store failure: {}", operation, err);
            }
        }
    }
}
