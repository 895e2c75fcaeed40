//! Generation provider clients
//!
//! Each provider speaks its own request/response dialect; both reduce their
//! payloads into [`NormalizedResult`] so the persister never sees a raw
//! provider shape.

pub mod recraft;
pub mod runway;

use sitegen_core::{Result, SitegenError};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const JSON_SNIPPET_LEN: usize = 280;

/// The provider-agnostic shape every client reduces its raw API payload
/// into. At least one of `url`/`base64`/`svg` must be present for the
/// result to be persistable.
#[derive(Debug, Clone)]
pub struct NormalizedResult {
    pub url: Option<String>,
    pub base64: Option<String>,
    pub svg: Option<String>,
    pub mime_type: Option<String>,
    /// The result object as the provider sent it, for diagnostics.
    pub raw: serde_json::Value,
}

pub(crate) fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        // Non-2xx bodies carry the provider's error message; read them
        // instead of turning them into transport errors.
        .http_status_as_error(false)
        .build();
    config.into()
}

/// Parse a response body as JSON. An empty body is `{}`; anything
/// unparseable fails with the HTTP status and a bounded body excerpt.
pub(crate) fn parse_json_body(
    text: &str,
    status: u16,
    provider: &str,
) -> Result<serde_json::Value> {
    if text.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }

    serde_json::from_str(text).map_err(|_| {
        SitegenError::ProviderError(format!(
            "{} returned invalid JSON ({}): {}",
            provider,
            status,
            truncate(text, JSON_SNIPPET_LEN)
        ))
    })
}

/// The provider's error message for a non-2xx response:
/// `error.message`, then a top-level `message`, then the given default.
pub(crate) fn error_message(body: &serde_json::Value, default: &str) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| body.get("message").and_then(|m| m.as_str()))
        .unwrap_or(default)
        .to_string()
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
