use anyhow::Context;
use bankfeed::api::{CredentialProvider, LlmExtractionClient, OcrClient};
use bankfeed::args::{Args, Command, IngestArgs};
use bankfeed::{Config, Pipeline, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    match args.command() {
        Command::Ingest(ingest_args) => ingest(ingest_args).await,
    }
}

async fn ingest(args: &IngestArgs) -> Result<()> {
    let mut config = Config::new().with_date_order(args.date_order());
    if let Some(endpoint) = args.ocr_endpoint() {
        config = config.with_ocr_endpoint(endpoint);
    }
    if let Some(endpoint) = args.llm_endpoint() {
        config = config.with_llm_endpoint(endpoint);
    }

    let bytes = tokio::fs::read(args.file())
        .await
        .with_context(|| format!("failed to read '{}'", args.file().display()))?;
    let file_name = args
        .file()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.file().to_string_lossy().to_string());

    // The extraction services are only constructed when both endpoints are
    // configured; tabular ingestion needs neither a token nor the network.
    let endpoints = config
        .ocr_endpoint()
        .map(str::to_string)
        .zip(config.llm_endpoint().map(str::to_string));
    let pipeline = match endpoints {
        Some((ocr_endpoint, llm_endpoint)) => {
            let token = CredentialProvider::new().token()?;
            let timeout = config.service_timeout();
            let recognizer = OcrClient::new(ocr_endpoint, token.clone(), timeout)?;
            let extractor = LlmExtractionClient::new(llm_endpoint, token, timeout)?;
            Pipeline::with_services(config, Box::new(recognizer), Box::new(extractor))
        }
        None => Pipeline::new(config),
    };

    let outcome = pipeline.ingest(&file_name, bytes, args.shape()).await?;
    let json =
        serde_json::to_string_pretty(&outcome).context("failed to serialize the outcome")?;
    println!("{json}");
    info!("{}", outcome.message);
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
