//! Deterministic collaborators for exercising `TicketService`
//!
//! `ManualClock` and `SequentialIds` replace the wall clock and the random id
//! generator. `FlakyStore` wraps any store and injects faults on demand.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tollgate_core::{
    models::Ticket,
    traits::{Clock, IdGenerator, TicketStore},
    AppError,
};
use uuid::Uuid;

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Generator yielding `00000000-0000-0000-0000-000000000001`, `...02`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id returned by the `n`th call (1-based)
    pub fn nth(n: u64) -> Uuid {
        Uuid::from_u128(u128::from(n))
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        Self::nth(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Fault injected by `FlakyStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Backend unreachable
    Unavailable,
    /// Stored record cannot be decoded
    Corrupt,
    /// Call never completes
    Hang,
}

impl Fault {
    async fn trigger(self) -> AppError {
        match self {
            Fault::Unavailable => AppError::StoreUnavailable("connection refused".to_string()),
            Fault::Corrupt => AppError::Encoding("unknown status \"parked\"".to_string()),
            Fault::Hang => std::future::pending().await,
        }
    }
}

/// Store wrapper that can fail reads or writes and counts every call
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    get_fault: Mutex<Option<Fault>>,
    put_fault: Mutex<Option<Fault>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl<S: TicketStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            get_fault: Mutex::new(None),
            put_fault: Mutex::new(None),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn fail_gets(&self, fault: Option<Fault>) {
        *self.get_fault.lock() = fault;
    }

    pub fn fail_puts(&self, fault: Option<Fault>) {
        *self.put_fault.lock() = fault;
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Write attempts, including failed ones
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: TicketStore> TicketStore for FlakyStore<S> {
    async fn put(&self, ticket: &Ticket) -> Result<(), AppError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let fault = *self.put_fault.lock();
        if let Some(fault) = fault {
            return Err(fault.trigger().await);
        }
        self.inner.put(ticket).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let fault = *self.get_fault.lock();
        if let Some(fault) = fault {
            return Err(fault.trigger().await);
        }
        self.inner.get(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(50));
        assert_eq!(clock.now(), start + Duration::minutes(50));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), SequentialIds::nth(1));
        assert_eq!(ids.next_id(), SequentialIds::nth(2));
        assert_eq!(
            SequentialIds::nth(2).to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }
}
