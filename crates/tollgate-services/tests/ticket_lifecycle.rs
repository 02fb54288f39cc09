//! End-to-end ticket lifecycle against the in-memory store
//!
//! The Redis-backed variant at the bottom needs a local Redis and is ignored
//! by default.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tollgate_core::{models::TicketStatus, traits::TicketStore};
use tollgate_services::{
    testing::{ManualClock, SequentialIds},
    TicketService,
};
use tollgate_store::{MemoryTicketStore, RedisTicketStore, TicketRecord};

fn service_with_clock(
    store: Arc<dyn TicketStore>,
) -> (TicketService<dyn TicketStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
    ));
    let service = TicketService::new(store, clock.clone(), Arc::new(SequentialIds::new()));
    (service, clock)
}

#[tokio::test]
async fn test_entry_to_exit() {
    let store = Arc::new(MemoryTicketStore::new());
    let (service, clock) = service_with_clock(store.clone());
    let cancel = CancellationToken::new();

    let ticket = service.open("ABC-123", 5, &cancel).await;
    assert_eq!(ticket.status, TicketStatus::Open);

    let stored = store.get(ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.plate, "ABC-123");
    assert_eq!(stored.lot, 5);
    assert_eq!(stored.status, TicketStatus::Open);

    clock.advance(Duration::minutes(50));
    let settlement = service
        .close(&ticket.id.to_string(), &cancel)
        .await
        .unwrap();

    assert_eq!(settlement.elapsed_minutes, 50);
    assert_eq!(settlement.ticket.charge, dec!(10.00));

    let stored = store.get(ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::Closed);
    assert_eq!(stored.charge, dec!(10.00));
}

#[tokio::test]
async fn test_concurrent_entries() {
    let store = Arc::new(MemoryTicketStore::new());
    let (service, _clock) = service_with_clock(store.clone());
    let service = Arc::new(service);
    let cancel = CancellationToken::new();

    let handles: Vec<_> = (0..32)
        .map(|lot| {
            let service = service.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { service.open(&format!("CAR-{}", lot), lot, &cancel).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(), 32);
}

#[tokio::test]
async fn test_settlement_serializes_for_transport() {
    let store = Arc::new(MemoryTicketStore::new());
    let (service, clock) = service_with_clock(store);
    let cancel = CancellationToken::new();

    let ticket = service.open("XYZ-789", 12, &cancel).await;
    clock.advance(Duration::minutes(16));
    let settlement = service
        .close(&ticket.id.to_string(), &cancel)
        .await
        .unwrap();

    let json = serde_json::to_value(&settlement).unwrap();
    assert_eq!(json["ticket"]["plate"], "XYZ-789");
    assert_eq!(json["ticket"]["lot"], 12);
    assert_eq!(json["ticket"]["status"], "closed");
    assert_eq!(json["ticket"]["charge"], "5.00");
    assert_eq!(json["elapsed_minutes"], 16);
    assert_eq!(json["already_settled"], false);
}

#[tokio::test]
async fn test_stored_record_shape() {
    let store = Arc::new(MemoryTicketStore::new());
    let (service, _clock) = service_with_clock(store.clone());
    let cancel = CancellationToken::new();

    let ticket = service.open("ABC-123", 5, &cancel).await;
    let stored = store.get(ticket.id).await.unwrap().unwrap();

    let record = TicketRecord::from(&stored);
    assert_eq!(record.ticket_id, SequentialIds::nth(1).to_string());
    assert_eq!(record.parking_lot, 5);
    assert_eq!(record.status, "open");
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn test_entry_to_exit_redis() {
    let store = Arc::new(
        RedisTicketStore::new("redis://127.0.0.1:6379", "tollgateLifecycleTest")
            .await
            .expect("Failed to connect to Redis"),
    );
    let service = TicketService::with_system_defaults(store.clone());
    let cancel = CancellationToken::new();

    let ticket = service.open("REDIS-01", 9, &cancel).await;
    let settlement = service
        .close(&ticket.id.to_string(), &cancel)
        .await
        .unwrap();

    assert_eq!(settlement.ticket.status, TicketStatus::Closed);
    assert_eq!(settlement.ticket.charge, dec!(2.50));

    let again = service
        .close(&ticket.id.to_string(), &cancel)
        .await
        .unwrap();
    assert!(again.already_settled);

    service.remove(&ticket.id.to_string(), &cancel).await.unwrap();
    assert!(store.get(ticket.id).await.unwrap().is_none());
}
