use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DebitError, Result};

/// Lifecycle state of a debit record.
///
/// Transitions: `Pending -> Processing -> {Loaded | Pending (retry) | Failed}`.
/// `Loaded -> {Successful | Failed}` happens on the provider status-check
/// path, which is not implemented yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebitStatus {
    Pending,
    Processing,
    Loaded,
    Successful,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Savings,
    Current,
}

/// A single request to pull funds from a payer's bank account via a
/// third-party provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debit {
    pub id: Uuid,
    /// Client identifier (UUID, number, reference, etc.) from the caller's system.
    pub client: Option<String>,
    /// Payment reference from the caller's system. Must be unique or None.
    pub downstream_reference: Option<String>,
    /// URL to call back when the debit moves to successful or failed.
    pub callback_url: Option<String>,
    /// Bank account holder's name, unvalidated.
    pub account_name: String,
    pub account_number: String,
    pub branch_code: String,
    pub account_type: Option<AccountType>,
    pub status: DebitStatus,
    /// Non-negative, always carries exactly 2 decimal places.
    pub amount: Decimal,
    /// Unique 9 digit debit reference, provider agnostic. Used as the
    /// client identifier on the wire.
    pub reference: String,
    /// Upstream debit provider, set by the provider module.
    pub provider: Option<String>,
    /// Upstream provider reference for later lookups.
    pub provider_reference: Option<String>,
    /// Upstream provider status text for error/success checks.
    pub provider_status: Option<String>,
    /// Pending debits are not loaded before this time.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Set when the provider accepts the debit.
    pub loaded_at: Option<DateTime<Utc>>,
    /// Number of times we have attempted to load the debit. Only increases.
    pub load_attempts: u32,
    /// Error message received on the last load attempt.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl Debit {
    /// Prepares this debit for JSON serialization, e.g. as an event payload.
    pub fn as_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.to_string(),
            "client": self.client,
            "downstream_reference": self.downstream_reference,
            "callback_url": self.callback_url,
            "account_name": self.account_name,
            "account_number": self.account_number,
            "branch_code": self.branch_code,
            "account_type": self.account_type,
            "status": self.status,
            "amount": self.amount.to_string(),
            "reference": self.reference,
            "provider": self.provider,
            "provider_reference": self.provider_reference,
            "provider_status": self.provider_status,
            "scheduled_at": self.scheduled_at.map(|t| t.to_rfc3339()),
            "loaded_at": self.loaded_at.map(|t| t.to_rfc3339()),
            "load_attempts": self.load_attempts,
            "last_error": self.last_error,
            "created_at": self.created_at.to_rfc3339(),
            "created_by": self.created_by,
            "updated_at": self.updated_at.to_rfc3339(),
            "updated_by": self.updated_by,
        })
    }
}

/// Fields accepted from the record-creation path. Provider-owned fields
/// (status, provider references, load bookkeeping) are not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDebit {
    pub client: Option<String>,
    pub downstream_reference: Option<String>,
    pub callback_url: Option<String>,
    pub account_name: String,
    pub account_number: String,
    pub branch_code: String,
    pub account_type: Option<AccountType>,
    pub amount: Decimal,
    /// Optional caller-supplied reference; generated when absent.
    pub reference: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

impl NewDebit {
    /// Builds a pending `Debit` from the accepted fields. The amount is
    /// normalized to 2 decimal places; negative amounts are rejected.
    pub fn into_debit(self, reference: String, now: DateTime<Utc>) -> Result<Debit> {
        if self.amount < Decimal::ZERO {
            return Err(DebitError::Validation(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        let mut amount = self.amount;
        amount.rescale(2);

        Ok(Debit {
            id: Uuid::new_v4(),
            client: self.client,
            downstream_reference: self.downstream_reference,
            callback_url: self.callback_url,
            account_name: self.account_name,
            account_number: self.account_number,
            branch_code: self.branch_code,
            account_type: self.account_type,
            status: DebitStatus::Pending,
            amount,
            reference,
            provider: None,
            provider_reference: None,
            provider_status: None,
            scheduled_at: self.scheduled_at,
            loaded_at: None,
            load_attempts: 0,
            last_error: None,
            created_at: now,
            created_by: self.created_by.clone(),
            updated_at: now,
            updated_by: self.created_by,
        })
    }
}

/// Result of one submission cycle. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub loaded: usize,
    pub retried: usize,
    pub failed: usize,
    /// Raw provider response, kept for audit logging.
    pub raw_response: String,
}

impl BatchOutcome {
    pub fn empty() -> Self {
        Self {
            loaded: 0,
            retried: 0,
            failed: 0,
            raw_response: String::new(),
        }
    }

    /// Human readable summary returned to the scheduler.
    pub fn summary(&self) -> String {
        if self.loaded == 0 && self.retried == 0 && self.failed == 0 {
            "No debits to submit".to_string()
        } else {
            format!(
                "Successfully loaded {}. Failed to load {}.",
                self.loaded,
                self.retried + self.failed
            )
        }
    }
}
