use serde::Deserialize;
use std::path::Path;

use crate::error::{DebitError, Result};

/// Top-level application configuration, usually loaded from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Registry name of the provider to use, e.g. "easydebit".
    pub provider: String,
    #[serde(flatten)]
    pub provider_config: ProviderConfig,
    /// Records are no longer selected once they reach this many attempts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Configuration handed to a provider's constructor. Replaces the
/// process-wide mutable config of earlier designs: every provider gets
/// its own owned copy.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub authentication: AuthConfig,
    /// Bank reference, usually a company slug. Max 4 usable chars.
    pub bank_ref: String,
    /// Where debits are placed in the provider's hierarchy.
    pub group_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Service reference in XXXX-XXXX-XXXX-XXXX form.
    pub service_reference: String,
    pub username: String,
}

/// Controls which provider error codes are treated as transient and how
/// far a retried record is pushed out.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Regex patterns for retryable error codes. A misclassified code
    /// silently converts a transient failure into a permanent one, so
    /// this list is configuration, never hard-coded.
    #[serde(default = "default_retryable_patterns")]
    pub retryable_patterns: Vec<String>,
    #[serde(default = "default_backoff_hours")]
    pub backoff_hours: i64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retryable_patterns: default_retryable_patterns(),
            backoff_hours: default_backoff_hours(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retryable_patterns() -> Vec<String> {
    vec![r"^PMT-AD-\d{6}$".to_string()]
}

fn default_backoff_hours() -> i64 {
    24
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| DebitError::Config(e.to_string()))
    }
}
