//! API credential lookup
//!
//! The Gemini API key is read from the process environment, after `.env`
//! has been loaded by `main`. `GEMINI_API_KEY` wins over the generic
//! `API_KEY`. Blank values count as missing.
//!
//! # Security
//! - The key is never written to config or logs
//! - The key is zeroized when the credentials are dropped

use std::fmt;
use zeroize::Zeroize;

const PRIMARY_VAR: &str = "GEMINI_API_KEY";
const FALLBACK_VAR: &str = "API_KEY";

/// Gemini API credentials.
pub(crate) struct GeminiCredentials {
    api_key: String,
}

impl GeminiCredentials {
    pub(crate) fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for GeminiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Drop for GeminiCredentials {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

/// Retrieve Gemini credentials from the environment.
pub(crate) fn get_gemini_credentials() -> Option<GeminiCredentials> {
    credentials_from(|name| std::env::var(name).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Option<GeminiCredentials> {
    [PRIMARY_VAR, FALLBACK_VAR]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(GeminiCredentials::new)
}
