//! Unstructured extraction: PDF and scanned statements.
//!
//! Two strategies are tried in order, each independently able to satisfy the
//! contract. The OCR strategy recognizes text and scans it line-by-line for
//! `date, merchant, amount` triplets, plus soft probes for statement
//! metadata. The language-model strategy asks the extraction service for
//! transaction-shaped records and converts them into [`RawRow`]s without
//! trusting their shape; the orchestrator re-validates every one through the
//! same resolvers used for tabular rows. The adapter fails hard only when
//! both strategies are exhausted without yielding a single transaction.

use crate::api::{RecordExtractor, TextRecognizer};
use crate::error::{IngestError, Result};
use crate::model::{CellValue, RawRow};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Which strategy produced the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOrigin {
    Ocr,
    Llm,
}

/// Best-effort statement metadata from the OCR text. Every field is probed
/// independently and fails soft to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementMetadata {
    pub statement_date: Option<String>,
    pub account_number: Option<String>,
    pub institution: Option<String>,
}

/// The adapter's output: RawRow-shaped candidates plus provenance.
#[derive(Debug)]
pub struct UnstructuredExtraction {
    pub rows: Vec<RawRow>,
    pub origin: ExtractionOrigin,
    pub metadata: StatementMetadata,
}

/// Runs the strategy ladder over a PDF/scan payload.
pub async fn extract(
    document: &[u8],
    recognizer: &dyn TextRecognizer,
    extractor: &dyn RecordExtractor,
) -> Result<UnstructuredExtraction> {
    let mut recognized_text = None;

    match recognizer.recognize(document).await {
        Ok(text) => {
            let rows = scan_transactions(&text);
            let metadata = probe_metadata(&text);
            debug!(rows = rows.len(), "ocr strategy scanned the recognized text");
            if !rows.is_empty() {
                return Ok(UnstructuredExtraction {
                    rows,
                    origin: ExtractionOrigin::Ocr,
                    metadata,
                });
            }
            recognized_text = Some((text, metadata));
        }
        Err(e) => warn!(strategy = "ocr", "strategy failed: {e}"),
    }

    // The language-model strategy works from whatever text we have: the OCR
    // output when the scanner found nothing in it, or a lossy rendering of
    // the raw bytes when OCR itself failed.
    let (text, metadata) = match recognized_text {
        Some((text, metadata)) if !text.trim().is_empty() => (text, metadata),
        _ => (
            String::from_utf8_lossy(document).to_string(),
            StatementMetadata::default(),
        ),
    };

    match extractor.extract_records(&text).await {
        Ok(records) => {
            let rows = rows_from_records(records);
            debug!(rows = rows.len(), "llm strategy returned records");
            if !rows.is_empty() {
                return Ok(UnstructuredExtraction {
                    rows,
                    origin: ExtractionOrigin::Llm,
                    metadata,
                });
            }
        }
        Err(e) => warn!(strategy = "llm", "strategy failed: {e}"),
    }

    Err(IngestError::NoTransactionsFound)
}

fn transaction_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // date, merchant text, amount (with optional trailing balance column)
        Regex::new(
            r"(?x)
            ^\s*
            (?P<date>\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}
              |\d{4}-\d{2}-\d{2}
              |\d{1,2}\s+[A-Za-z]{3,9}\.?\s+\d{2,4})
            \s+
            (?P<desc>.+?)
            \s+
            (?P<amount>\(?-?[₦$€£¥₹]?[\d,]+\.\d{2}\)?(?:\s?(?:DR|CR))?)
            (?:\s+[₦$€£¥₹]?[\d,]+\.\d{2})?   # running balance, ignored
            \s*$",
        )
        .expect("the transaction line pattern is valid")
    })
}

/// Scans recognized statement text for transaction triplets, one candidate
/// per matching line. Labels are the canonical `Date`/`Description`/`Amount`
/// so the field resolver picks them up at top rank.
pub(crate) fn scan_transactions(text: &str) -> Vec<RawRow> {
    let re = transaction_line_regex();
    text.lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            Some(RawRow::new(vec![
                ("Date".to_string(), CellValue::from(&caps["date"])),
                (
                    "Description".to_string(),
                    CellValue::from(caps["desc"].trim()),
                ),
                ("Amount".to_string(), CellValue::from(&caps["amount"])),
            ]))
        })
        .collect()
}

fn statement_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)statement\s+(?:date|period)[:\s]+([0-9A-Za-z ,/\-.]+)")
            .expect("the statement date pattern is valid")
    })
}

fn account_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)account\s+(?:no|number|#)[.:\s]*([0-9Xx*\-]{4,})")
            .expect("the account number pattern is valid")
    })
}

fn institution_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z][A-Za-z&' ]+(?:Bank|Microfinance|Credit Union))")
            .expect("the institution pattern is valid")
    })
}

/// Probes for statement-level metadata. Each probe is independent and a
/// failed probe never aborts the page.
pub(crate) fn probe_metadata(text: &str) -> StatementMetadata {
    StatementMetadata {
        statement_date: statement_date_regex()
            .captures(text)
            .map(|c| c[1].trim().to_string()),
        account_number: account_number_regex()
            .captures(text)
            .map(|c| c[1].to_string()),
        institution: institution_regex()
            .captures(text)
            .map(|c| c[1].trim().to_string()),
    }
}

/// Converts untrusted service records into RawRows. Only JSON objects
/// survive; each key becomes a column label and each value is rendered as
/// text. Nothing about the shape is assumed beyond that.
pub(crate) fn rows_from_records(records: Vec<Value>) -> Vec<RawRow> {
    records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(map) => {
                let row: RawRow = map
                    .into_iter()
                    .map(|(key, value)| (key, json_cell(value)))
                    .collect();
                (!row.is_blank()).then_some(row)
            }
            other => {
                warn!("discarding a non-object record from the extraction service: {other}");
                None
            }
        })
        .collect()
}

fn json_cell(value: Value) -> CellValue {
    match value {
        Value::String(s) => CellValue::from(s),
        Value::Number(n) => CellValue::from(n.to_string()),
        Value::Bool(b) => CellValue::from(b.to_string()),
        Value::Null => CellValue::Empty,
        // Nested structures are rendered verbatim; the resolvers will treat
        // them as text.
        other => CellValue::from(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StaticRecordExtractor, StaticTextRecognizer};
    use serde_json::json;

    const STATEMENT_TEXT: &str = "\
FIRST HORIZON Bank\n\
Statement Date: 31/01/2023\n\
Account No: 0123456789\n\
\n\
03/01/2023  ATM WITHDRAWAL LAGOS   2,500.00  97,500.00\n\
05/01/2023  POS GROCERIES          1,200.00  96,300.00\n\
15/01/2023  SALARY JANUARY        50,000.00 146,300.00\n";

    #[test]
    fn test_scanner_extracts_triplets() {
        let rows = scan_transactions(STATEMENT_TEXT);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].get("Description").unwrap().as_text(),
            "ATM WITHDRAWAL LAGOS"
        );
        assert_eq!(rows[0].get("Amount").unwrap().as_text(), "2,500.00");
        // The trailing running balance must not be captured as the amount.
        assert_eq!(rows[2].get("Amount").unwrap().as_text(), "50,000.00");
    }

    #[test]
    fn test_scanner_ignores_non_transaction_lines() {
        assert!(scan_transactions("Dear customer,\nThank you for banking with us.\n").is_empty());
    }

    #[test]
    fn test_metadata_probes() {
        let metadata = probe_metadata(STATEMENT_TEXT);
        assert_eq!(metadata.statement_date.as_deref(), Some("31/01/2023"));
        assert_eq!(metadata.account_number.as_deref(), Some("0123456789"));
        assert_eq!(metadata.institution.as_deref(), Some("FIRST HORIZON Bank"));
    }

    #[test]
    fn test_metadata_probes_fail_soft() {
        let metadata = probe_metadata("no recognizable metadata here");
        assert_eq!(metadata, StatementMetadata::default());
    }

    #[test]
    fn test_records_to_rows_discards_non_objects() {
        let rows = rows_from_records(vec![
            json!({"date": "2023-01-03", "description": "ATM", "amount": "2500", "type": "debit"}),
            json!("not an object"),
            json!(42),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("description").unwrap().as_text(), "ATM");
    }

    #[tokio::test]
    async fn test_ocr_strategy_wins_when_it_yields_rows() {
        let recognizer = StaticTextRecognizer::with_text(STATEMENT_TEXT);
        let extractor = StaticRecordExtractor::failing();
        let extraction = extract(b"%PDF", &recognizer, &extractor).await.unwrap();
        assert_eq!(extraction.origin, ExtractionOrigin::Ocr);
        assert_eq!(extraction.rows.len(), 3);
        assert!(extraction.metadata.account_number.is_some());
    }

    #[tokio::test]
    async fn test_llm_strategy_covers_ocr_failure() {
        let recognizer = StaticTextRecognizer::failing();
        let extractor = StaticRecordExtractor::with_records(vec![
            json!({"date": "2023-01-03", "description": "ATM", "amount": "2500", "type": "debit"}),
            json!({"date": "2023-01-05", "description": "POS", "amount": "1200", "type": "debit"}),
            json!({"date": "2023-01-15", "description": "SALARY", "amount": "50000", "type": "credit"}),
        ]);
        let extraction = extract(b"%PDF", &recognizer, &extractor).await.unwrap();
        assert_eq!(extraction.origin, ExtractionOrigin::Llm);
        assert_eq!(extraction.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_llm_strategy_covers_unscannable_text() {
        // OCR succeeds but the scanner finds nothing; the LLM gets the text.
        let recognizer = StaticTextRecognizer::with_text("handwritten scrawl");
        let extractor = StaticRecordExtractor::with_records(vec![json!({
            "date": "2023-02-01", "description": "CHEQUE", "amount": "10"
        })]);
        let extraction = extract(b"%PDF", &recognizer, &extractor).await.unwrap();
        assert_eq!(extraction.origin, ExtractionOrigin::Llm);
        assert_eq!(extraction.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_both_strategies_exhausted() {
        let recognizer = StaticTextRecognizer::failing();
        let extractor = StaticRecordExtractor::failing();
        let err = extract(b"%PDF", &recognizer, &extractor).await.unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionsFound));
    }

    #[tokio::test]
    async fn test_empty_results_from_both_is_no_transactions() {
        let recognizer = StaticTextRecognizer::with_text("nothing useful");
        let extractor = StaticRecordExtractor::with_records(vec![]);
        let err = extract(b"%PDF", &recognizer, &extractor).await.unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionsFound));
    }
}
