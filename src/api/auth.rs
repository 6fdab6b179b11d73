//! Credential resolution
//!
//! Request signing belongs to the transport gateway in front of the remote
//! API; this crate only needs a token to ride along on each call. The token
//! is resolved from the `SGSYNC_TOKEN` environment variable first, then from
//! the credentials file next to the user config.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "SGSYNC_TOKEN";

/// Resolved API credentials
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Build credentials from an explicit token (tests, embedding callers).
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Resolve credentials: environment first, credentials file second.
    pub fn resolve() -> Result<Self> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("using token from {}", TOKEN_ENV);
                return Ok(Self::new(token));
            }
        }

        let path = credentials_path().context("could not determine credentials path")?;
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no credentials: set {} or create {}",
                TOKEN_ENV,
                path.display()
            )
        })?;
        let token = token_from_json(&content)
            .with_context(|| format!("invalid credentials file {}", path.display()))?;
        tracing::debug!("using token from {}", path.display());
        Ok(Self::new(token))
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

fn credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sgsync").join("credentials.json"))
}

/// Pull the token out of a credentials file body: `{"token": "…"}`.
fn token_from_json(content: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    value
        .get("token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .context("credentials file has no \"token\" field")
}
