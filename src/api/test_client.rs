//! In-memory implementations of the service traits.
//!
//! Note: these are compiled even in the "production" version of this app so
//! that the whole pipeline can be run, top-to-bottom, without reaching the
//! extraction services.

use crate::api::{RecordExtractor, TextRecognizer};
use crate::error::{IngestError, Result};
use serde_json::Value;

/// A [`TextRecognizer`] that returns canned text, or fails on demand.
pub struct StaticTextRecognizer {
    text: Option<String>,
}

impl StaticTextRecognizer {
    /// Always returns `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Always fails, simulating an unreachable service.
    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait::async_trait]
impl TextRecognizer for StaticTextRecognizer {
    async fn recognize(&self, _document: &[u8]) -> Result<String> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(IngestError::ExtractionService {
                service: "ocr".to_string(),
                reason: "test recognizer configured to fail".to_string(),
            }),
        }
    }
}

/// A [`RecordExtractor`] that returns canned records, or fails on demand.
pub struct StaticRecordExtractor {
    records: Option<Vec<Value>>,
}

impl StaticRecordExtractor {
    /// Always returns `records`.
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// Always fails, simulating an unreachable service.
    pub fn failing() -> Self {
        Self { records: None }
    }
}

#[async_trait::async_trait]
impl RecordExtractor for StaticRecordExtractor {
    async fn extract_records(&self, _text: &str) -> Result<Vec<Value>> {
        match &self.records {
            Some(records) => Ok(records.clone()),
            None => Err(IngestError::ExtractionService {
                service: "llm".to_string(),
                reason: "test extractor configured to fail".to_string(),
            }),
        }
    }
}
