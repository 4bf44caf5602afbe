//! Decides whether a rejected item is retried or failed permanently.
//!
//! This is the single most load-bearing rule in the system: a
//! misclassified code silently converts a transient failure into a
//! permanent one, or the reverse. The retryable patterns therefore come
//! from configuration and unknown codes default to terminal failure.

use chrono::Duration;
use regex::Regex;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::error::{DebitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one code matched a retryable pattern: reschedule the item.
    Retry { code: String },
    /// Anything else: fail the item, recording every code received.
    Terminal { joined_codes: String },
}

pub struct RetryClassifier {
    patterns: Vec<Regex>,
    backoff: Duration,
}

impl RetryClassifier {
    pub fn from_config(config: &RetryConfig) -> Result<Self> {
        let patterns = config
            .retryable_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    DebitError::Config(format!("invalid retryable pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            backoff: Duration::hours(config.backoff_hours),
        })
    }

    /// How far a retried record's schedule is pushed out.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Classifies the error codes attached to one rejected item. Only a
    /// single code matching a retryable pattern yields a retry; multiple
    /// codes or any unrecognized code is terminal.
    pub fn classify(&self, codes: &[String]) -> Classification {
        if let [code] = codes
            && self.patterns.iter().any(|p| p.is_match(code))
        {
            info!(code = %code, "error code classified retryable");
            return Classification::Retry { code: code.clone() };
        }

        let joined_codes = codes.join(", ");
        warn!(codes = %joined_codes, "error codes not retryable, failing terminally");
        Classification::Terminal { joined_codes }
    }
}
