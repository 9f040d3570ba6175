//! The canonical output of the pipeline: [`NormalizedTransaction`] and the
//! batch-level [`IngestOutcome`] that wraps it.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether money moved in or out. `Unknown` is a legal terminal state and is
/// surfaced to the caller; it is never silently coerced for storage.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
    #[default]
    Unknown,
}

serde_plain::derive_display_from_serialize!(Direction);
serde_plain::derive_fromstr_from_deserialize!(Direction);

/// The record shape the caller intends to import into. Only affects which
/// suggestion rule table is consulted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    #[default]
    Expense,
    Revenue,
}

serde_plain::derive_display_from_serialize!(RecordShape);
serde_plain::derive_fromstr_from_deserialize!(RecordShape);

/// A category (expense) or source (revenue) proposal. The confidence is a
/// relative ranking signal in `[0, 1]`, not a calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub confidence: f64,
}

/// One entry in a row's diagnostic trail: which fallback or heuristic fired
/// while resolving the row. These never abort a batch; they exist so a human
/// reviewer can see exactly how confident each field is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// No date column matched; the batch ingestion instant was used.
    DateDefaulted,
    /// The numeric date was valid under both day-first and month-first
    /// reading; the configured order was applied.
    AmbiguousDateOrder,
    /// No description column matched; the sentinel text was used.
    DescriptionDefaulted,
    /// The description was composed from secondary columns.
    DescriptionComposed,
    /// No amount column matched; the amount is zero.
    AmountDefaulted,
    /// The amount came from scanning all amount-like columns rather than a
    /// ranked candidate match.
    AmountScanned,
    /// No direction signal resolved; the policy default (debit) was applied.
    DirectionDefaulted,
    /// Direction was inferred from keywords in the description text.
    DirectionFromKeywords,
    /// Direction was inferred from the sign of a signed amount.
    DirectionFromSign,
    /// The row originated from the language-model strategy and was
    /// re-validated through the shared resolvers.
    RevalidatedLlmRecord,
}

serde_plain::derive_display_from_serialize!(Resolution);

/// The canonical output unit handed to the ledger collaborator. Created once
/// by the orchestrator and never mutated by the pipeline afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    /// Day-level, time-zone naive. Never null: rows with no resolvable date
    /// carry the batch ingestion date and a `DateDefaulted` diagnostic.
    pub date: NaiveDate,
    /// Never empty: falls back to [`UNKNOWN_DESCRIPTION`].
    pub description: String,
    /// Non-negative magnitude. Sign information lives in `direction`.
    pub amount: Decimal,
    pub direction: Direction,
    /// Present when the caller asked for the expense rule table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_category: Option<Suggestion>,
    /// Present when the caller asked for the revenue rule table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_source: Option<Suggestion>,
    /// Index of the RawRow this transaction was derived from, for audit and
    /// re-resolution.
    pub source_row: usize,
    /// Shared by all transactions produced from one ingestion run.
    pub batch_id: String,
    /// The fallbacks and heuristics that fired while resolving this row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolutions: Vec<Resolution>,
}

/// Sentinel used when no description can be resolved.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Transaction";

/// The result of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub transactions: Vec<NormalizedTransaction>,
    pub batch_id: String,
    /// The single captured instant used as the date fallback for every row in
    /// the batch.
    pub ingested_at: NaiveDateTime,
    /// A printable summary of the run.
    pub message: String,
}
