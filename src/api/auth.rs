//! Bearer-credential lookup for the extraction services.
//!
//! The credential is read from the `BANKFEED_API_TOKEN` environment variable
//! or, failing that, from `~/.bankfeed/credentials.json`. Its absence is a
//! hard [`IngestError::Auth`], never a silent skip: a batch that needs the
//! unstructured path cannot limp along without it.

use crate::error::{IngestError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const TOKEN_ENV_VAR: &str = "BANKFEED_API_TOKEN";
const CREDENTIALS_DIR: &str = ".bankfeed";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    token: String,
}

/// Supplies the bearer credential for outbound extraction-service calls.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    credentials_path: Option<PathBuf>,
}

impl CredentialProvider {
    /// A provider using the default credentials file location under the
    /// user's home directory.
    pub fn new() -> Self {
        Self {
            credentials_path: dirs::home_dir().map(|h| h.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE)),
        }
    }

    /// A provider reading from a specific credentials file, used in tests.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: Some(path.into()),
        }
    }

    /// Resolves the bearer token: environment variable first, then the
    /// credentials file.
    pub fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        let path = self.credentials_path.as_deref().ok_or_else(|| {
            IngestError::Auth(format!(
                "no home directory; set {TOKEN_ENV_VAR} to provide a credential"
            ))
        })?;
        if !path.is_file() {
            return Err(IngestError::Auth(format!(
                "set {TOKEN_ENV_VAR} or create {}",
                path.display()
            )));
        }
        let token = read_token(path)?;
        if token.trim().is_empty() {
            return Err(IngestError::Auth(format!(
                "the credential in {} is empty",
                path.display()
            )));
        }
        Ok(token)
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn read_token(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;
    let parsed: CredentialsFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse credentials at {}", path.display()))?;
    Ok(parsed.token)
}
