//! Record-creation path: reference assignment, persistence and the
//! `model.created` event emission.

use chrono::Utc;
use tracing::warn;

use crate::domain::debit::{Debit, NewDebit};
use crate::domain::ports::{DebitStoreBox, EventSinkBox};
use crate::domain::reference::random_reference;
use crate::error::{DebitError, Result};

pub const REFERENCE_LENGTH: usize = 9;
const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Creates debit records on behalf of the external API layer.
///
/// The event emission is an explicit step of this service rather than a
/// persistence hook, so tests can observe it and failures stay visible.
pub struct DebitService {
    store: DebitStoreBox,
    events: EventSinkBox,
}

impl DebitService {
    pub fn new(store: DebitStoreBox, events: EventSinkBox) -> Self {
        Self { store, events }
    }

    /// Persists a new debit record. A unique reference is generated when
    /// the caller did not supply one. The store's uniqueness constraints
    /// remain the authoritative guard; the generation loop is only a
    /// fast pre-check.
    pub async fn create(&self, new: NewDebit) -> Result<Debit> {
        let mut new = new;
        let reference = match new.reference.take() {
            Some(reference) => reference,
            None => self.generate_unique_reference().await?,
        };

        let debit = new.into_debit(reference, Utc::now())?;
        self.store.insert(debit.clone()).await?;

        // Fire and forget: a sink failure must not fail the creation.
        if let Err(e) = self.events.record_created(&debit).await {
            warn!(debit_id = %debit.id, error = %e, "failed to emit created event");
        }

        Ok(debit)
    }

    /// Draws Luhn-checksummed reference candidates until one is unused.
    /// Aborts with an error after 10 collisions rather than ever
    /// returning a non-unique value.
    pub async fn generate_unique_reference(&self) -> Result<String> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let candidate = {
                let mut rng = rand::thread_rng();
                random_reference(&mut rng, REFERENCE_LENGTH)
            };
            if !self.store.reference_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DebitError::ReferenceGeneration(MAX_GENERATION_ATTEMPTS))
    }
}
