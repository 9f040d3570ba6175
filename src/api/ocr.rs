//! HTTP client for the OCR text-recognition service.

use crate::api::{with_retries, TextRecognizer};
use crate::error::{IngestError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const SERVICE_NAME: &str = "ocr";

/// The service's response body. `errored` set (or a non-2xx status) is a
/// failure even when text is present.
#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    errored: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Calls the OCR service over HTTP with a bearer credential, a bounded
/// timeout, and a couple of retries with backoff.
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl OcrClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build the OCR http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    async fn call(&self, document: &[u8]) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(document.to_vec())
            .send()
            .await
            .map_err(|e| IngestError::ExtractionService {
                service: SERVICE_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ExtractionService {
                service: SERVICE_NAME.to_string(),
                reason: format!("http status {status}"),
            });
        }

        let body: OcrResponse =
            response
                .json()
                .await
                .map_err(|e| IngestError::ExtractionService {
                    service: SERVICE_NAME.to_string(),
                    reason: format!("malformed response body: {e}"),
                })?;
        if body.errored {
            return Err(IngestError::ExtractionService {
                service: SERVICE_NAME.to_string(),
                reason: body
                    .error
                    .unwrap_or_else(|| "the service reported an error".to_string()),
            });
        }
        Ok(body.text)
    }
}

#[async_trait::async_trait]
impl TextRecognizer for OcrClient {
    async fn recognize(&self, document: &[u8]) -> Result<String> {
        with_retries(|| self.call(document)).await
    }
}
