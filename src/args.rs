//! These structs provide the CLI interface for the bankfeed CLI.

use crate::model::RecordShape;
use crate::resolve::DateOrder;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// bankfeed: A command-line tool for ingesting bank statements.
///
/// The purpose of this program is to take a statement file exported or
/// downloaded from a bank (CSV, TSV, XLSX, XLS or PDF), normalize every
/// transaction in it, and print the resulting batch as JSON. Columns are
/// recognized by header name across the wildly different export formats banks
/// produce, and rows with missing or malformed fields are degraded with
/// per-row diagnostics rather than rejected.
///
/// PDF and scanned statements are handled through remote extraction services.
/// Those need an API token (BANKFEED_API_TOKEN or ~/.bankfeed/credentials.json)
/// and the service endpoints passed as flags or environment variables.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest one statement file and print the normalized batch as JSON.
    Ingest(IngestArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Common {
    pub fn new(log_level: LevelFilter) -> Self {
        Self { log_level }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// Args for the `bankfeed ingest` command.
#[derive(Debug, Parser, Clone)]
pub struct IngestArgs {
    /// The statement file to ingest.
    file: PathBuf,

    /// The record shape the batch is destined for. Decides whether expense
    /// categories or revenue sources are suggested.
    #[arg(long, value_enum, default_value_t = RecordShape::Expense)]
    shape: RecordShape,

    /// How to read an all-numeric date that is valid either way, like
    /// 03/04/2023.
    #[arg(long, value_enum, default_value_t = DateOrder::DayFirst)]
    date_order: DateOrder,

    /// The OCR service endpoint. Required for PDF and scanned statements.
    #[arg(long, env = "BANKFEED_OCR_URL")]
    ocr_endpoint: Option<String>,

    /// The record-extraction service endpoint. Required for PDF and scanned
    /// statements.
    #[arg(long, env = "BANKFEED_LLM_URL")]
    llm_endpoint: Option<String>,
}

impl IngestArgs {
    pub fn new(
        file: impl Into<PathBuf>,
        shape: RecordShape,
        date_order: DateOrder,
        ocr_endpoint: Option<String>,
        llm_endpoint: Option<String>,
    ) -> Self {
        Self {
            file: file.into(),
            shape,
            date_order,
            ocr_endpoint,
            llm_endpoint,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn shape(&self) -> RecordShape {
        self.shape
    }

    pub fn date_order(&self) -> DateOrder {
        self.date_order
    }

    pub fn ocr_endpoint(&self) -> Option<&str> {
        self.ocr_endpoint.as_deref()
    }

    pub fn llm_endpoint(&self) -> Option<&str> {
        self.llm_endpoint.as_deref()
    }
}
