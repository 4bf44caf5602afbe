use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

use crate::domain::ports::DebitTransport;
use crate::error::{DebitError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTPS transport to the provider endpoint.
///
/// The timeout bounds the single blocking call of a submission cycle; on
/// timeout the whole batch counts as failed and every selected record
/// stays `Processing`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl DebitTransport for HttpTransport {
    async fn post_xml(&self, path: &str, body: String) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, bytes = body.len(), "posting payment batch");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DebitError::Transport(format!(
                "{url} returned {status}"
            )));
        }
        Ok(response.text().await?)
    }
}
