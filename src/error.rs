//! Error types for the ingestion pipeline.
//!
//! Only a handful of conditions abort a batch; they are enumerated in
//! [`IngestError`]. Everything else (unparseable dates, missing columns,
//! ambiguous direction) is absorbed by field-level fallbacks and recorded in
//! the per-row diagnostics instead.

/// Terminal failures. Any of these aborts the batch before a single
/// transaction is produced.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file is not delimited text, a spreadsheet, or a PDF.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The payload exceeds the configured byte ceiling.
    #[error("file is too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: usize, limit: usize },

    /// No bearer credential is available for the extraction services.
    #[error("missing extraction service credential: {0}")]
    Auth(String),

    /// A network call to the OCR or LLM service failed hard.
    #[error("extraction service '{service}' failed: {reason}")]
    ExtractionService { service: String, reason: String },

    /// The file yielded no transactions at all: both unstructured strategies
    /// ran and produced nothing, or a tabular file held no non-blank data
    /// rows.
    #[error("no transactions could be extracted from the document")]
    NoTransactionsFound,

    /// Anything unexpected from the surrounding plumbing (I/O and the like).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
