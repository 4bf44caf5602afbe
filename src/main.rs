use clap::Parser;
use maguire::application::classifier::RetryClassifier;
use maguire::application::engine::BatchEngine;
use maguire::config::AppConfig;
use maguire::domain::ports::{DebitStoreBox, DebitTransportBox};
use maguire::infrastructure::http::{DEFAULT_TIMEOUT, HttpTransport};
use maguire::infrastructure::in_memory::InMemoryDebitStore;
use maguire::providers::create_provider;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runs one debit submission cycle against the configured provider.
///
/// Meant to be invoked by an external scheduler; the summary goes to
/// stdout and fatal cycle errors (transport, malformed response) exit
/// non-zero for operational alerting.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    config: PathBuf,

    /// Override the configured maximum load attempts
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_file(&cli.config).into_diagnostic()?;
    let max_attempts = cli.max_attempts.unwrap_or(config.max_attempts);

    let transport: DebitTransportBox = Box::new(
        HttpTransport::new(config.provider_config.base_url.clone(), DEFAULT_TIMEOUT)
            .into_diagnostic()?,
    );
    let provider =
        create_provider(&config.provider, &config.provider_config, transport).into_diagnostic()?;
    let classifier = RetryClassifier::from_config(&config.retry).into_diagnostic()?;

    // The in-memory store makes the binary self-contained; a deployment
    // swaps in a persistent DebitStore behind the same port.
    let store: DebitStoreBox = Box::new(InMemoryDebitStore::new());

    let engine = BatchEngine::new(store, provider, classifier);
    let summary = engine.submit_pending(max_attempts).await.into_diagnostic()?;
    println!("{summary}");

    Ok(())
}
