//! Configuration for an ingestion run.

use crate::classify::DEFAULT_MAX_FILE_BYTES;
use crate::resolve::DateOrder;
use std::time::Duration;

/// How long a single extraction-service call may take before it is abandoned.
const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings that shape one ingestion call. Everything has a sensible default;
/// callers override what they need (typically just the date order, which is a
/// locale hint only the caller can know).
#[derive(Debug, Clone)]
pub struct Config {
    max_file_bytes: usize,
    date_order: DateOrder,
    ocr_endpoint: Option<String>,
    llm_endpoint: Option<String>,
    service_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            date_order: DateOrder::default(),
            ocr_endpoint: None,
            llm_endpoint: None,
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_bytes(mut self, max: usize) -> Self {
        self.max_file_bytes = max;
        self
    }

    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    pub fn with_ocr_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ocr_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_llm_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.llm_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout = timeout;
        self
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
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

    pub fn service_timeout(&self) -> Duration {
        self.service_timeout
    }
}
