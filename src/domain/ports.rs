use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::debit::Debit;
use crate::error::Result;

/// Persistence port for debit records.
///
/// Implementations are the authoritative guard for the uniqueness
/// invariants: `insert` must reject duplicate references and duplicate
/// non-null downstream references, regardless of any pre-checks done by
/// callers.
#[async_trait]
pub trait DebitStore: Send + Sync {
    async fn insert(&self, debit: Debit) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Debit>>;
    async fn update(&self, debit: Debit) -> Result<()>;

    /// Records eligible for submission: `Pending`, fewer than
    /// `max_attempts` load attempts, and not scheduled in the future.
    /// Ordering is stable within one call but otherwise unspecified.
    async fn select_pending(&self, max_attempts: u32, now: DateTime<Utc>) -> Result<Vec<Debit>>;

    /// Conditionally transitions the given records to `Processing` and
    /// returns the ones that actually transitioned. Rows no longer
    /// `Pending` at write time are skipped, so two overlapping cycles
    /// cannot both submit the same record.
    async fn mark_processing(&self, ids: &[Uuid], now: DateTime<Utc>) -> Result<Vec<Debit>>;

    async fn reference_exists(&self, reference: &str) -> Result<bool>;
}

/// Outbound transport to the provider endpoint.
#[async_trait]
pub trait DebitTransport: Send + Sync {
    /// POSTs an XML body to `path` under the configured base URL and
    /// returns the response body. Non-2xx statuses and timeouts are
    /// transport errors; per-item rejections are not.
    async fn post_xml(&self, path: &str, body: String) -> Result<String>;
}

/// Fire-and-forget event side-channel. The write path calls this
/// explicitly after persisting a new record; there are no implicit
/// persistence hooks.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record_created(&self, debit: &Debit) -> Result<()>;
}

pub type DebitStoreBox = Box<dyn DebitStore>;
pub type DebitTransportBox = Box<dyn DebitTransport>;
pub type EventSinkBox = Box<dyn EventSink>;
