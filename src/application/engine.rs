//! Batch submission engine: one cycle of select, mark, submit, reconcile.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::classifier::{Classification, RetryClassifier};
use crate::domain::debit::{BatchOutcome, Debit, DebitStatus};
use crate::domain::ports::DebitStoreBox;
use crate::error::Result;
use crate::providers::DebitProviderBox;

/// Orchestrates submission cycles against a single configured provider.
///
/// Invoked by an external scheduler; each cycle runs to completion or
/// fails as a whole. Within one cycle there is exactly one outbound
/// provider call, and each record's state transition is persisted
/// independently of the others.
pub struct BatchEngine {
    store: DebitStoreBox,
    provider: DebitProviderBox,
    classifier: RetryClassifier,
}

impl BatchEngine {
    pub fn new(store: DebitStoreBox, provider: DebitProviderBox, classifier: RetryClassifier) -> Self {
        Self {
            store,
            provider,
            classifier,
        }
    }

    /// Runs one submission cycle and returns the summary handed back to
    /// the scheduler. Transport and parse failures propagate; per-item
    /// rejections do not.
    pub async fn submit_pending(&self, max_attempts: u32) -> Result<String> {
        let outcome = self.run_cycle(max_attempts).await?;
        Ok(outcome.summary())
    }

    /// Same as [`submit_pending`](Self::submit_pending) but returns the
    /// structured outcome, including the raw provider response.
    pub async fn run_cycle(&self, max_attempts: u32) -> Result<BatchOutcome> {
        let now = Utc::now();
        let candidates = self.store.select_pending(max_attempts, now).await?;
        if candidates.is_empty() {
            info!("no pending debits eligible for submission");
            return Ok(BatchOutcome::empty());
        }

        // Conditional mark: records grabbed by an overlapping cycle in
        // the meantime drop out here instead of being submitted twice.
        let ids: Vec<Uuid> = candidates.iter().map(|d| d.id).collect();
        let debits = self.store.mark_processing(&ids, now).await?;
        if debits.is_empty() {
            return Ok(BatchOutcome::empty());
        }
        info!(items = debits.len(), "submitting pending debits");

        let submitted_at = Utc::now();
        let result = self.provider.submit_batch(&debits, submitted_at).await?;

        let mut outcome = BatchOutcome {
            loaded: 0,
            retried: 0,
            failed: 0,
            raw_response: result.raw,
        };

        for debit in debits {
            let updated = match result.response.error_for(&debit.reference) {
                None => {
                    // No error entry means accepted: the protocol has no
                    // positive acknowledgement, success is inferred by
                    // subtraction from the submitted set.
                    outcome.loaded += 1;
                    self.loaded_transition(debit)
                }
                Some(item) => match self.classifier.classify(&item.codes) {
                    Classification::Retry { code } => {
                        outcome.retried += 1;
                        self.retry_transition(debit, code)
                    }
                    Classification::Terminal { joined_codes } => {
                        outcome.failed += 1;
                        self.failed_transition(debit, joined_codes)
                    }
                },
            };

            // Partial-batch semantics: the unit of atomicity is the
            // single record. One failed update must not abort the rest.
            if let Err(e) = self.store.update(updated.clone()).await {
                error!(debit_id = %updated.id, error = %e, "failed to persist debit outcome");
            }
        }

        info!(
            loaded = outcome.loaded,
            retried = outcome.retried,
            failed = outcome.failed,
            "submission cycle complete"
        );
        Ok(outcome)
    }

    fn loaded_transition(&self, mut debit: Debit) -> Debit {
        let now = Utc::now();
        debit.status = DebitStatus::Loaded;
        debit.loaded_at = Some(now);
        debit.provider = Some(self.provider.name().to_string());
        // Placeholder until the status-check path supplies the real one.
        debit.provider_reference = Some("TBC".to_string());
        debit.load_attempts += 1;
        debit.updated_at = now;
        debit
    }

    fn retry_transition(&self, mut debit: Debit, code: String) -> Debit {
        let now = Utc::now();
        debit.status = DebitStatus::Pending;
        debit.scheduled_at = Some(now + self.classifier.backoff());
        debit.last_error = Some(code);
        debit.load_attempts += 1;
        debit.updated_at = now;
        debit
    }

    fn failed_transition(&self, mut debit: Debit, joined_codes: String) -> Debit {
        let now = Utc::now();
        debit.status = DebitStatus::Failed;
        debit.last_error = Some(joined_codes);
        debit.load_attempts += 1;
        debit.updated_at = now;
        debit
    }
}
