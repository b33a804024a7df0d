//! Futu Datafeed Binary
//!
//! Fetches historical bars from Futu OpenD and prints them as JSON lines.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin futu-datafeed -- SEHK 00700 d 2024-01-01 2024-03-31
//! ```
//!
//! # Environment Variables
//!
//! - `FUTU_CONFIG_PATH`: YAML config file (default: config.yaml)
//! - `FUTU_OPEND_HOST`: OpenD host, when referenced from the config file
//! - `RUST_LOG`: Log filter (default: futu_datafeed=info)

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use futu_datafeed::application::ports::{OutputSink, TracingOutput};
use futu_datafeed::cli::{USAGE, parse_args};
use futu_datafeed::config::{Config, load_config};
use futu_datafeed::error::DatafeedError;
use futu_datafeed::infrastructure::encryption::RsaKeyFileEncryption;
use futu_datafeed::infrastructure::opend::OpenDConnector;
use futu_datafeed::telemetry::init_tracing;
use futu_datafeed::{Completeness, FutuDatafeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    run().await.context("futu-datafeed failed")
}

async fn run() -> Result<(), DatafeedError> {
    let config = load_config(None)?;
    init_tracing(&config.observability.logging)?;
    log_config(&config);

    let request = parse_args(std::env::args().skip(1)).inspect_err(|_| eprintln!("{USAGE}"))?;

    let output: Arc<dyn OutputSink> = Arc::new(TracingOutput);
    let connector = Arc::new(OpenDConnector::new(config.opend.client_config()));
    let mut datafeed = FutuDatafeed::new(connector, Box::new(RsaKeyFileEncryption::new()))
        .with_output(Arc::clone(&output));

    if !datafeed.init(&config.futu).await {
        return Err(DatafeedError::NotInitialized {
            address: config.futu.address.clone(),
            port: config.futu.port,
        });
    }

    let history = datafeed
        .query_bar_history_detailed(&request, output.as_ref())
        .await;

    if let Completeness::Partial {
        pages_fetched,
        error,
    } = &history.completeness
    {
        tracing::warn!(
            symbol = %request.symbol,
            exchange = %request.exchange,
            pages_fetched,
            %error,
            "History is incomplete"
        );
    }

    let written = write_bars(&history.bars);
    datafeed.close().await;
    written
}

/// Print bars to stdout, one JSON object per line.
fn write_bars(bars: &[futu_datafeed::Bar]) -> Result<(), DatafeedError> {
    let mut stdout = std::io::stdout().lock();
    for bar in bars {
        serde_json::to_writer(&mut stdout, bar)?;
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Log the loaded configuration.
fn log_config(config: &Config) {
    tracing::info!(
        address = %config.futu.address,
        port = config.futu.port,
        encrypted = config.futu.is_encrypted,
        client_id = %config.opend.client_id,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
