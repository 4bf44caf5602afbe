use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::debit::{Debit, DebitStatus};
use crate::domain::ports::{DebitStore, EventSink};
use crate::error::{DebitError, Result};

/// A thread-safe in-memory store for debit records.
///
/// Uses `Arc<RwLock<HashMap<Uuid, Debit>>>` to allow shared concurrent
/// access. Enforces the reference and downstream-reference uniqueness
/// constraints the way a relational backend would with unique indexes.
#[derive(Default, Clone)]
pub struct InMemoryDebitStore {
    debits: Arc<RwLock<HashMap<Uuid, Debit>>>,
}

impl InMemoryDebitStore {
    /// Creates a new, empty in-memory debit store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DebitStore for InMemoryDebitStore {
    async fn insert(&self, debit: Debit) -> Result<()> {
        let mut debits = self.debits.write().await;

        if debits.values().any(|d| d.reference == debit.reference) {
            return Err(DebitError::Store(format!(
                "duplicate reference {}",
                debit.reference
            )));
        }
        // Null downstream references never collide; only values do.
        if let Some(downstream) = &debit.downstream_reference
            && debits
                .values()
                .any(|d| d.downstream_reference.as_ref() == Some(downstream))
        {
            return Err(DebitError::Store(format!(
                "duplicate downstream reference {downstream}"
            )));
        }

        debits.insert(debit.id, debit);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Debit>> {
        let debits = self.debits.read().await;
        Ok(debits.get(&id).cloned())
    }

    async fn update(&self, debit: Debit) -> Result<()> {
        let mut debits = self.debits.write().await;
        if !debits.contains_key(&debit.id) {
            return Err(DebitError::Store(format!("unknown debit {}", debit.id)));
        }
        debits.insert(debit.id, debit);
        Ok(())
    }

    async fn select_pending(&self, max_attempts: u32, now: DateTime<Utc>) -> Result<Vec<Debit>> {
        let debits = self.debits.read().await;
        let mut selected: Vec<Debit> = debits
            .values()
            .filter(|d| {
                d.status == DebitStatus::Pending
                    && d.load_attempts < max_attempts
                    && d.scheduled_at.is_none_or(|at| at <= now)
            })
            .cloned()
            .collect();
        // Deterministic order within one call.
        selected.sort_by_key(|d| (d.created_at, d.id));
        Ok(selected)
    }

    async fn mark_processing(&self, ids: &[Uuid], now: DateTime<Utc>) -> Result<Vec<Debit>> {
        let mut debits = self.debits.write().await;
        let mut marked = Vec::with_capacity(ids.len());
        for id in ids {
            // Compare-and-swap form: rows that stopped being Pending
            // since selection are skipped, not resubmitted.
            if let Some(debit) = debits.get_mut(id)
                && debit.status == DebitStatus::Pending
            {
                debit.status = DebitStatus::Processing;
                debit.updated_at = now;
                marked.push(debit.clone());
            }
        }
        Ok(marked)
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool> {
        let debits = self.debits.read().await;
        Ok(debits.values().any(|d| d.reference == reference))
    }
}

/// A `model.created` notification as recorded by the in-memory sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub source_id: Uuid,
    pub event_type: String,
    pub event_at: DateTime<Utc>,
    pub event_data: serde_json::Value,
    pub created_by: Option<String>,
}

/// In-memory event side-channel, mostly useful for tests and as the
/// reference shape for a real queue-backed sink.
#[derive(Default, Clone)]
pub struct InMemoryEventSink {
    events: Arc<RwLock<Vec<RecordedEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn record_created(&self, debit: &Debit) -> Result<()> {
        let mut events = self.events.write().await;
        events.push(RecordedEvent {
            source_id: debit.id,
            event_type: "model.created".to_string(),
            event_at: Utc::now(),
            event_data: debit.as_json(),
            created_by: debit.created_by.clone(),
        });
        Ok(())
    }
}
