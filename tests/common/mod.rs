use async_trait::async_trait;
use chrono::Utc;
use maguire::application::classifier::RetryClassifier;
use maguire::application::engine::BatchEngine;
use maguire::config::{AuthConfig, ProviderConfig, RetryConfig};
use maguire::domain::debit::Debit;
use maguire::domain::debit::NewDebit;
use maguire::domain::ports::{DebitTransport, DebitTransportBox};
use maguire::error::{DebitError, Result};
use maguire::infrastructure::in_memory::InMemoryDebitStore;
use maguire::providers::create_provider;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const EMPTY_ERROR_LIST: &str = r#"
    <SRP xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <EL/>
    </SRP>
"#;

pub const SINGLE_RETRYABLE_ERROR: &str = r#"
    <SRP xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <EL>
            <E>
                <CI>222333222</CI>
                <CL>
                    <C>PMT-AD-000003</C>
                </CL>
            </E>
        </EL>
    </SRP>
"#;

pub const UNKNOWN_ERROR_CODES: &str = r#"
    <SRP xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <EL>
            <E>
                <CI>222333222</CI>
                <CL>
                    <C>UNKNOWN-ERROR-CODE-01</C>
                    <C>UNKNOWN-ERROR-CODE-02</C>
                </CL>
            </E>
        </EL>
    </SRP>
"#;

/// Transport double that returns a canned response (or a transport
/// error) and records how it was called.
pub struct ScriptedTransport {
    response: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub last_body: Arc<Mutex<Option<String>>>,
}

impl ScriptedTransport {
    pub fn responding(body: &str) -> Self {
        Self {
            response: Some(body.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_body: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_body: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl DebitTransport for ScriptedTransport {
    async fn post_xml(&self, _path: &str, body: String) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body);
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(DebitError::Transport("connection refused".to_string())),
        }
    }
}

pub fn provider_config() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://provider.invalid/Services/PaymentService.svc/PartnerServices/"
            .to_string(),
        authentication: AuthConfig {
            service_reference: "XXXX-XXXX-XXXX-XXXX".to_string(),
            username: "testuser".to_string(),
        },
        bank_ref: "TEST".to_string(),
        group_code: "TESTGROUP".to_string(),
    }
}

/// A pending debit shaped like the reference fixtures.
pub fn pending_debit(reference: &str) -> Debit {
    NewDebit {
        client: Some("bobby was here".to_string()),
        account_name: "Bobby Ninetoes".to_string(),
        account_number: "123412341234".to_string(),
        branch_code: "632005".to_string(),
        account_type: Some(maguire::domain::debit::AccountType::Current),
        amount: dec!(13500.00),
        scheduled_at: Some(Utc::now() - chrono::Duration::hours(1)),
        ..Default::default()
    }
    .into_debit(reference.to_string(), Utc::now())
    .unwrap()
}

/// Engine wired to the EasyDebit provider over a scripted transport.
pub fn engine_with(store: InMemoryDebitStore, transport: ScriptedTransport) -> BatchEngine {
    let transport: DebitTransportBox = Box::new(transport);
    engine_with_transport(store, transport)
}

/// Engine wired to the EasyDebit provider over real HTTP.
pub fn engine_with_http(store: InMemoryDebitStore, base_url: String) -> BatchEngine {
    let transport: DebitTransportBox = Box::new(
        maguire::infrastructure::http::HttpTransport::new(
            base_url,
            std::time::Duration::from_secs(5),
        )
        .unwrap(),
    );
    engine_with_transport(store, transport)
}

fn engine_with_transport(store: InMemoryDebitStore, transport: DebitTransportBox) -> BatchEngine {
    let config = provider_config();
    let provider = create_provider("easydebit", &config, transport).unwrap();
    let classifier = RetryClassifier::from_config(&RetryConfig::default()).unwrap();
    BatchEngine::new(Box::new(store), provider, classifier)
}
