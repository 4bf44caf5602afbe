mod common;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::pending_debit;
use maguire::application::debits::DebitService;
use maguire::domain::debit::{Debit, NewDebit};
use maguire::domain::ports::DebitStore;
use maguire::domain::reference::is_luhn_valid;
use maguire::error::{DebitError, Result};
use maguire::infrastructure::in_memory::{InMemoryDebitStore, InMemoryEventSink};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn new_debit() -> NewDebit {
    NewDebit {
        client: Some("bobby was here".to_string()),
        account_name: "Bobby Ninetoes".to_string(),
        account_number: "123412341234".to_string(),
        branch_code: "632005".to_string(),
        amount: dec!(13500.00),
        ..Default::default()
    }
}

fn service(store: &InMemoryDebitStore, sink: &InMemoryEventSink) -> DebitService {
    DebitService::new(Box::new(store.clone()), Box::new(sink.clone()))
}

#[tokio::test]
async fn test_create_assigns_luhn_valid_reference() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let debit = service.create(new_debit()).await.unwrap();

    assert_eq!(debit.reference.len(), 9);
    assert!(is_luhn_valid(&debit.reference));
    assert!(store.reference_exists(&debit.reference).await.unwrap());
}

#[tokio::test]
async fn test_create_emits_created_event() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let debit = service.create(new_debit()).await.unwrap();

    let events = sink.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source_id, debit.id);
    assert_eq!(events[0].event_type, "model.created");
    assert_eq!(events[0].event_data["amount"], "13500.00");
    assert_eq!(events[0].event_data["status"], "pending");
}

#[tokio::test]
async fn test_supplied_reference_is_stored_verbatim() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let mut new = new_debit();
    new.reference = Some("222333222".to_string());
    let debit = service.create(new).await.unwrap();

    assert_eq!(debit.reference, "222333222");
}

#[tokio::test]
async fn test_duplicate_supplied_reference_is_rejected() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let mut first = new_debit();
    first.reference = Some("222333222".to_string());
    service.create(first).await.unwrap();

    let mut second = new_debit();
    second.reference = Some("222333222".to_string());
    let result = service.create(second).await;

    assert!(matches!(result, Err(DebitError::Store(_))));
    // The failed creation emitted no event.
    assert_eq!(sink.events().await.len(), 1);
}

#[tokio::test]
async fn test_null_downstream_references_are_not_unique() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    // Both created without a downstream reference.
    service.create(new_debit()).await.unwrap();
    service.create(new_debit()).await.unwrap();

    assert_eq!(sink.events().await.len(), 2);
}

#[tokio::test]
async fn test_generated_references_are_distinct() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let mut references = std::collections::HashSet::new();
    for _ in 0..50 {
        let debit = service.create(new_debit()).await.unwrap();
        assert!(references.insert(debit.reference));
    }
}

#[tokio::test]
async fn test_creation_rejects_negative_amounts() {
    let store = InMemoryDebitStore::new();
    let sink = InMemoryEventSink::new();
    let service = service(&store, &sink);

    let mut new = new_debit();
    new.amount = dec!(-5.00);
    assert!(matches!(
        service.create(new).await,
        Err(DebitError::Validation(_))
    ));
    assert!(sink.events().await.is_empty());
}

/// Store double where every reference candidate is already taken.
struct CollidingStore;

#[async_trait]
impl DebitStore for CollidingStore {
    async fn insert(&self, _debit: Debit) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Debit>> {
        Ok(None)
    }

    async fn update(&self, _debit: Debit) -> Result<()> {
        Ok(())
    }

    async fn select_pending(&self, _max_attempts: u32, _now: DateTime<Utc>) -> Result<Vec<Debit>> {
        Ok(Vec::new())
    }

    async fn mark_processing(&self, _ids: &[Uuid], _now: DateTime<Utc>) -> Result<Vec<Debit>> {
        Ok(Vec::new())
    }

    async fn reference_exists(&self, _reference: &str) -> Result<bool> {
        Ok(true)
    }
}

#[tokio::test]
async fn test_generation_exhaustion_is_fatal() {
    // Ten consecutive collisions abort generation instead of ever
    // handing back a non-unique reference.
    let sink = InMemoryEventSink::new();
    let service = DebitService::new(Box::new(CollidingStore), Box::new(sink.clone()));

    let result = service.generate_unique_reference().await;
    assert!(matches!(result, Err(DebitError::ReferenceGeneration(10))));
}

#[tokio::test]
async fn test_creation_fails_when_generation_is_exhausted() {
    let sink = InMemoryEventSink::new();
    let service = DebitService::new(Box::new(CollidingStore), Box::new(sink.clone()));

    let result = service.create(new_debit()).await;
    assert!(matches!(result, Err(DebitError::ReferenceGeneration(10))));
    // Nothing was persisted, so nothing was announced.
    assert!(sink.events().await.is_empty());
}

#[tokio::test]
async fn test_fixture_debits_insert_cleanly() {
    // Guard for the shared fixture: it must satisfy the store's
    // uniqueness constraints like API-created records do.
    let store = InMemoryDebitStore::new();
    store.insert(pending_debit("111222111")).await.unwrap();
    store.insert(pending_debit("222333222")).await.unwrap();
}
