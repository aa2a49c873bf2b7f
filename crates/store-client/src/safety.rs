//! Outbound HTTP hygiene: base URL validation and error redaction.
//!
//! Store errors end up in tool output that is shown to an agent, so anything derived from a
//! `reqwest` error is stripped of credentials and query strings first.

use crate::error::StoreError;
use url::Url;

/// Parse and validate the configured store base URL.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] if the URL does not parse, uses a scheme other than
/// `http`/`https`, or has no host.
pub fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| StoreError::Validation(format!("invalid store URL '{raw}': {e}")))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(StoreError::Validation(format!(
            "invalid store URL '{raw}': unsupported scheme '{scheme}'"
        )));
    }
    if url.host_str().is_none() {
        return Err(StoreError::Validation(format!(
            "invalid store URL '{raw}': missing host"
        )));
    }
    Ok(url)
}

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_body() || e.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };

    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    format!("{kind}: {msg}")
}
