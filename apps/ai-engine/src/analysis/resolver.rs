//! Response Resolver — turns raw model output into validated structures.
//!
//! Resolution order:
//! 1. the transport's pre-parsed JSON value, when present;
//! 2. the raw text with a ```json fence stripped, then any bare ``` fence;
//! 3. the first `{...}` span located by a greedy regex.
//!
//! Failures are typed; callers decide whether to propagate or substitute a
//! `SafeFallback` object.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::llm_client::RawResponse;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no JSON payload found in model output")]
    NoJsonPayload,

    #[error("schema deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Resolves a raw response into `T`, preferring the pre-parsed value over
/// text recovery.
pub fn resolve<T: DeserializeOwned>(raw: &RawResponse) -> Result<T, ResolveError> {
    if let Some(parsed) = &raw.parsed {
        return Ok(serde_json::from_value(parsed.clone())?);
    }

    let payload = extract_json_payload(&raw.text).ok_or(ResolveError::NoJsonPayload)?;
    Ok(serde_json::from_str(payload)?)
}

/// Locates the JSON payload inside free text: fenced block first, then the
/// first brace span.
fn extract_json_payload(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if let Some(inner) = strip_fence(trimmed) {
        return Some(inner);
    }
    brace_span(trimmed)
}

/// Strips a leading ```json ... ``` or ``` ... ``` fence.
/// Returns None when the text is not fenced.
fn strip_fence(text: &str) -> Option<&str> {
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))?;
    let inner = inner.trim_start();
    // Cut at the closing fence: models often append prose after it.
    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    Some(inner.trim_end())
}

/// Greedy `{...}` match. Best-effort: over-captures when prose after the
/// object contains a stray `}`. Kept for parity with the original recovery
/// behavior (see DESIGN.md open questions).
fn brace_span(text: &str) -> Option<&str> {
    static BRACE_RE: OnceLock<Regex> = OnceLock::new();
    let re = BRACE_RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid brace regex"));
    re.find(text).map(|m| m.as_str())
}
