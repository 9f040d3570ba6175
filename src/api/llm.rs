//! HTTP client for the language-model extraction service.
//!
//! The service is asked to return an array of transaction-shaped records for
//! a page of statement text. Models do not reliably return clean JSON, so the
//! response is parsed defensively: the first bracketed array found anywhere
//! in the reply is extracted and each element is returned as untrusted JSON
//! for the caller to re-validate through the normal resolvers.

use crate::api::{with_retries, RecordExtractor};
use crate::error::{IngestError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SERVICE_NAME: &str = "llm";

/// The instruction sent with every extraction request.
const EXTRACTION_INSTRUCTION: &str = "Extract every transaction from the following bank \
statement text. Respond with only a JSON array where each element has the keys \
\"date\", \"description\", \"amount\" and \"type\" (credit or debit). \
Do not include any other text.";

#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    instruction: &'a str,
    document: &'a str,
}

/// The service may answer with a direct array or with a content string that
/// embeds one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractionResponse {
    Records(Vec<Value>),
    Wrapped { content: String },
}

/// Calls the language-model extraction service with a bearer credential, a
/// bounded timeout, and retries with backoff.
pub struct LlmExtractionClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl LlmExtractionClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build the extraction http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    async fn call(&self, text: &str) -> Result<Vec<Value>> {
        let request = ExtractionRequest {
            instruction: EXTRACTION_INSTRUCTION,
            document: text,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
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

        let body: ExtractionResponse =
            response
                .json()
                .await
                .map_err(|e| IngestError::ExtractionService {
                    service: SERVICE_NAME.to_string(),
                    reason: format!("malformed response body: {e}"),
                })?;

        match body {
            ExtractionResponse::Records(records) => Ok(records),
            ExtractionResponse::Wrapped { content } => Ok(find_embedded_array(&content)),
        }
    }
}

#[async_trait::async_trait]
impl RecordExtractor for LlmExtractionClient {
    async fn extract_records(&self, text: &str) -> Result<Vec<Value>> {
        with_retries(|| self.call(text)).await
    }
}

/// Locates the first bracketed array substring in free text and parses it.
/// Bracket depth is tracked with string-literal awareness so brackets inside
/// descriptions do not truncate the array. Returns an empty list when no
/// parseable array exists; the caller treats that as "strategy yielded
/// nothing", not as an error.
pub(crate) fn find_embedded_array(text: &str) -> Vec<Value> {
    let Some(start) = text.find('[') else {
        return Vec::new();
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (ix, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..start + ix + 1];
                    return serde_json::from_str(candidate).unwrap_or_default();
                }
            }
            _ => {}
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_array_in_prose() {
        let text = r#"Here are the transactions you asked for:
[{"date": "2023-01-03", "description": "ATM", "amount": "2500"}]
Let me know if you need anything else."#;
        let records = find_embedded_array(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["description"], "ATM");
    }

    #[test]
    fn test_brackets_inside_strings_do_not_truncate() {
        let text = r#"[{"description": "POS [TERMINAL 9]", "amount": "5"}]"#;
        let records = find_embedded_array(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["description"], "POS [TERMINAL 9]");
    }

    #[test]
    fn test_nested_arrays() {
        let text = r#"noise [[1, 2], [3]] trailing"#;
        let records = find_embedded_array(text);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_no_array_yields_empty() {
        assert!(find_embedded_array("I could not find any transactions.").is_empty());
        assert!(find_embedded_array("").is_empty());
    }

    #[test]
    fn test_unparseable_array_yields_empty() {
        assert!(find_embedded_array("[not json]").is_empty());
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let text = r#"[{"description": "JOE\"S [BAR]"}]"#;
        let records = find_embedded_array(text);
        assert_eq!(records.len(), 1);
    }
}
