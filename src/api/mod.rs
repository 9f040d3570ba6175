//! Clients for the external extraction collaborators.
//!
//! The unstructured path depends on two remote services: an OCR service that
//! turns document pages into text, and a language-model service that turns
//! text into transaction-shaped records. Both are reached through traits so
//! the pipeline can run top-to-bottom against in-memory doubles.

mod auth;
mod llm;
mod ocr;
mod test_client;

use crate::error::Result;

pub use auth::CredentialProvider;
pub use llm::LlmExtractionClient;
pub use ocr::OcrClient;
pub use test_client::{StaticRecordExtractor, StaticTextRecognizer};

/// Recognizes text in a scanned or typed document.
#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized text for the whole document. An empty string
    /// means the service ran but found nothing usable.
    async fn recognize(&self, document: &[u8]) -> Result<String>;
}

/// Extracts transaction-shaped records from free text via a language model.
/// The returned values are untrusted JSON; callers must re-validate every
/// element before use.
#[async_trait::async_trait]
pub trait RecordExtractor: Send + Sync {
    async fn extract_records(&self, text: &str) -> Result<Vec<serde_json::Value>>;
}

/// How many times a failed service call is retried before giving up.
pub(crate) const SERVICE_RETRIES: u32 = 2;

/// Base delay between retries; doubled on each attempt.
pub(crate) const RETRY_BACKOFF_MS: u64 = 500;

/// Runs `operation` with a small number of retries and exponential backoff.
/// Returns the last error when every attempt fails.
pub(crate) async fn with_retries<T, F, Fut>(operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = RETRY_BACKOFF_MS;
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < SERVICE_RETRIES => {
                tracing::warn!(attempt, "extraction service call failed, retrying: {e}");
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
