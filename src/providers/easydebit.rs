//! EasyDebit once-off payment integration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use md5::Md5;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{DebitProvider, SubmitResult};
use crate::config::{AuthConfig, ProviderConfig};
use crate::domain::debit::Debit;
use crate::domain::ports::DebitTransportBox;
use crate::error::{DebitError, Result};
use crate::interfaces::xml::request_writer::{Credentials, RequestParams, build_request};
use crate::interfaces::xml::response_reader::parse_response;

pub const PROVIDER_NAME: &str = "EasyDebit";

const SAVE_PAYMENTS_PATH: &str = "SaveOnceOffPayments";

pub struct EasyDebitProvider {
    config: ProviderConfig,
    /// Derived once at construction and reused for every request.
    credentials: Credentials,
    transport: DebitTransportBox,
}

impl EasyDebitProvider {
    pub fn new(config: ProviderConfig, transport: DebitTransportBox) -> Self {
        let credentials = derive_credentials(&config.authentication);
        Self {
            config,
            credentials,
            transport,
        }
    }
}

/// EasyDebit's credential scheme: the wire password is
/// `sha256(username ++ uppercase_hex(md5(service_reference)))`,
/// hex encoded.
fn derive_credentials(auth: &AuthConfig) -> Credentials {
    let md5_hex = hex::encode_upper(Md5::digest(auth.service_reference.as_bytes()));

    let mut hasher = Sha256::new();
    hasher.update(auth.username.as_bytes());
    hasher.update(md5_hex.as_bytes());
    let secret = hex::encode(hasher.finalize());

    Credentials {
        username: auth.username.clone(),
        secret,
    }
}

#[async_trait]
impl DebitProvider for EasyDebitProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn submit_batch(&self, debits: &[Debit], now: DateTime<Utc>) -> Result<SubmitResult> {
        let params = RequestParams {
            group_code: &self.config.group_code,
            bank_ref: &self.config.bank_ref,
        };
        let payload = build_request(&self.credentials, &params, debits, now)?;
        debug!(items = debits.len(), "submitting payment batch");

        let raw = self.transport.post_xml(SAVE_PAYMENTS_PATH, payload).await?;
        let response = parse_response(&raw)?;

        Ok(SubmitResult { response, raw })
    }

    async fn check_status(&self, _reference: &str) -> Result<String> {
        // GetPaymentStatus is not wired up yet; loaded debits stay loaded
        // until this path exists.
        Err(DebitError::NotImplemented("EasyDebit check_status"))
    }
}
