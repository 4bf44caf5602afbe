//! Provider integrations and the static provider registry.
//!
//! Exactly one provider is active at a time. Providers are resolved by
//! name at process startup through a plain `match`, so an unknown name
//! fails fast and the capability set is checked by the compiler.

pub mod easydebit;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::ProviderConfig;
use crate::domain::debit::Debit;
use crate::domain::ports::DebitTransportBox;
use crate::error::{DebitError, Result};
use crate::interfaces::xml::response_reader::PaymentResponse;

/// What came back from one batch submission: the parsed per-item error
/// view plus the raw document for audit logging.
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub response: PaymentResponse,
    pub raw: String,
}

/// Capability set every debit provider implements.
#[async_trait]
pub trait DebitProvider: Send + Sync {
    /// Display name recorded on loaded debits.
    fn name(&self) -> &'static str;

    /// Encodes the given debits into one batch payload, submits it over
    /// the transport and returns the parsed response. Transport and
    /// parse failures are whole-cycle errors; per-item rejections are
    /// reported inside the result.
    async fn submit_batch(&self, debits: &[Debit], now: DateTime<Utc>) -> Result<SubmitResult>;

    /// Queries the provider-side status of a previously loaded debit.
    async fn check_status(&self, reference: &str) -> Result<String>;
}

pub type DebitProviderBox = Box<dyn DebitProvider>;

/// Resolves a configured provider name to a constructed provider.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    transport: DebitTransportBox,
) -> Result<DebitProviderBox> {
    match name {
        "easydebit" => Ok(Box::new(easydebit::EasyDebitProvider::new(
            config.clone(),
            transport,
        ))),
        other => Err(DebitError::Config(format!("unknown provider {other:?}"))),
    }
}
