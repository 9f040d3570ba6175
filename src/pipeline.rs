//! The ingestion orchestrator.
//!
//! One call sequences the whole pipeline: classify the file, extract
//! candidate rows through the matching path, resolve every row's canonical
//! fields, and attach suggestions. Data-quality problems degrade individual
//! rows with diagnostics; the run fails only for an unsupported or oversized
//! file, an exhausted unstructured path, or a file with no transactions at
//! all.

use crate::api::{RecordExtractor, TextRecognizer};
use crate::classify::{self, ClassifiedFile};
use crate::config::Config;
use crate::error::{IngestError, Result};
use crate::extract::{tabular, unstructured, ExtractionOrigin};
use crate::model::{IngestOutcome, NormalizedTransaction, RawRow, RecordShape, Resolution};
use crate::resolve::{self, date};
use crate::suggest;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Runs ingestion end to end. The extraction services are optional; without
/// them the pipeline handles tabular files and rejects PDFs and scans.
pub struct Pipeline {
    config: Config,
    recognizer: Option<Box<dyn TextRecognizer>>,
    extractor: Option<Box<dyn RecordExtractor>>,
}

impl Pipeline {
    /// A pipeline that handles tabular files only.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            recognizer: None,
            extractor: None,
        }
    }

    /// A pipeline with the unstructured path enabled.
    pub fn with_services(
        config: Config,
        recognizer: Box<dyn TextRecognizer>,
        extractor: Box<dyn RecordExtractor>,
    ) -> Self {
        Self {
            config,
            recognizer: Some(recognizer),
            extractor: Some(extractor),
        }
    }

    /// Ingests one file and returns the normalized batch.
    ///
    /// The ingestion instant is captured exactly once, up front, so every
    /// row that needs the date fallback in this batch gets the same date.
    pub async fn ingest(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        shape: RecordShape,
    ) -> Result<IngestOutcome> {
        let ingested_at = Utc::now().naive_utc();
        let batch_id = Uuid::new_v4().to_string();
        info!(file_name, batch_id, "ingesting");

        let classified = classify::classify(file_name, bytes, self.config.max_file_bytes())?;
        let (rows, date_hint, origin) = match classified {
            ClassifiedFile::Tabular(kind, bytes) => {
                let grid = tabular::extract(kind, &bytes)?;
                let hint = grid.date_hint_column().map(str::to_string);
                (grid.rows, hint, None)
            }
            ClassifiedFile::Unstructured(bytes) => {
                let (Some(recognizer), Some(extractor)) = (&self.recognizer, &self.extractor)
                else {
                    return Err(IngestError::ExtractionService {
                        service: "ocr".to_string(),
                        reason: "no extraction services are configured for this run".to_string(),
                    });
                };
                let extraction =
                    unstructured::extract(&bytes, recognizer.as_ref(), extractor.as_ref()).await?;
                if extraction.metadata != Default::default() {
                    debug!(?extraction.metadata, "statement metadata probed");
                }
                (extraction.rows, None, Some(extraction.origin))
            }
        };

        let mut transactions = Vec::new();
        let mut skipped_blank = 0usize;
        for (source_row, row) in rows.iter().enumerate() {
            if row.is_blank() {
                skipped_blank += 1;
                continue;
            }
            transactions.push(self.normalize_row(
                row,
                source_row,
                &batch_id,
                ingested_at.date(),
                date_hint.as_deref(),
                origin,
                shape,
            ));
        }

        if transactions.is_empty() {
            return Err(IngestError::NoTransactionsFound);
        }

        let message = format!(
            "Ingested {} transaction(s) from '{}'{}.",
            transactions.len(),
            file_name,
            if skipped_blank > 0 {
                format!(" ({skipped_blank} blank row(s) skipped)")
            } else {
                String::new()
            }
        );
        info!(
            transactions = transactions.len(),
            skipped_blank, batch_id, "ingestion complete"
        );

        Ok(IngestOutcome {
            transactions,
            batch_id,
            ingested_at,
            message,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn normalize_row(
        &self,
        row: &RawRow,
        source_row: usize,
        batch_id: &str,
        fallback_date: chrono::NaiveDate,
        date_hint: Option<&str>,
        origin: Option<ExtractionOrigin>,
        shape: RecordShape,
    ) -> NormalizedTransaction {
        let resolved = resolve::resolve_row(row, self.config.date_order());
        let mut resolutions = resolved.resolutions;

        // When no ranked date candidate matched, the sniffed date column is
        // tried before the batch fallback kicks in.
        let date = match resolved.date {
            Some(parsed) => parsed.date,
            None => {
                let hinted = date_hint
                    .and_then(|label| row.get(label))
                    .and_then(|cell| date::normalize(cell, self.config.date_order()));
                match hinted {
                    Some(parsed) => {
                        if parsed.ambiguous {
                            resolutions.push(Resolution::AmbiguousDateOrder);
                        }
                        parsed.date
                    }
                    None => {
                        resolutions.push(Resolution::DateDefaulted);
                        fallback_date
                    }
                }
            }
        };

        if origin == Some(ExtractionOrigin::Llm) {
            resolutions.push(Resolution::RevalidatedLlmRecord);
        }

        let suggestion = suggest::suggest(&resolved.description, shape);
        let (suggested_category, suggested_source) = match shape {
            RecordShape::Expense => (Some(suggestion), None),
            RecordShape::Revenue => (None, Some(suggestion)),
        };

        NormalizedTransaction {
            date,
            description: resolved.description,
            amount: resolved.amount,
            direction: resolved.direction.direction,
            suggested_category,
            suggested_source,
            source_row,
            batch_id: batch_id.to_string(),
            resolutions,
        }
    }
}
