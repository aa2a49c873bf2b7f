//! Rendering of store results and failures into MCP tool results.
//!
//! Every result carries a human/agent-readable text block plus `structured_content`. Some MCP
//! clients only render `content` and ignore `structured_content`, so the text is never empty.

use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};
use snap_store_client::{PackageDetail, PackageSummary, StoreError};
use std::fmt::Write as _;

const LOOKUP_SUGGESTION: &str =
    "Check that the package name is exact, or use 'search_snaps' to find it first.";

/// Render a search listing. An empty result set yields an explicit "no results" message.
#[must_use]
pub fn search_listing(query: &str, results: &[PackageSummary]) -> CallToolResult {
    let text = if results.is_empty() {
        format!("no results for '{query}'")
    } else {
        let noun = if results.len() == 1 { "snap" } else { "snaps" };
        let mut out = format!("Found {} {noun} for '{query}':\n", results.len());
        for p in results {
            let _ = writeln!(out, "{}", summary_line(p));
        }
        out.trim_end().to_string()
    };

    success(
        text,
        json!({
            "query": query,
            "results": results,
        }),
    )
}

/// Render one package's details as `key: value` lines, close to `snap info` output.
#[must_use]
pub fn package_detail(detail: &PackageDetail) -> CallToolResult {
    let mut out = String::new();
    let _ = writeln!(out, "name: {}", detail.name);
    let _ = writeln!(out, "title: {}", detail.title);
    let _ = writeln!(out, "summary: {}", one_line(&detail.summary));
    let _ = writeln!(
        out,
        "publisher: {}",
        publisher_label(&detail.publisher, detail.publisher_verified)
    );
    let _ = writeln!(out, "version: {}", or_dash(&detail.version));
    let _ = writeln!(out, "license: {}", or_dash(&detail.license));
    let _ = writeln!(out, "snap-id: {}", or_dash(&detail.snap_id));
    let _ = writeln!(out, "contact: {}", or_dash(&detail.contact));
    let _ = writeln!(out, "website: {}", or_dash(&detail.website));
    let _ = writeln!(out, "store-url: {}", detail.store_url);

    if detail.channels.is_empty() {
        let _ = writeln!(out, "channels: -");
    } else {
        let _ = writeln!(out, "channels:");
        for c in &detail.channels {
            let revision = c
                .revision
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            let _ = writeln!(
                out,
                "  {}: {} (rev {revision}, {}, {}, released {})",
                c.channel,
                or_dash(&c.version),
                or_dash(&c.architecture),
                or_dash(&c.confinement),
                or_dash(&c.released_at),
            );
        }
    }

    let _ = writeln!(out, "description:");
    for line in detail.description.lines() {
        let _ = writeln!(out, "  {line}");
    }

    success(out.trim_end().to_string(), json!({ "package": detail }))
}

/// Render a failure as an error tool result. Never a protocol-level error.
#[must_use]
pub fn failure(err: &StoreError) -> CallToolResult {
    let message = failure_message(err);
    let suggestion = match err {
        StoreError::NotFound { .. } => Some(LOOKUP_SUGGESTION),
        StoreError::RateLimited | StoreError::Network(_) => Some("Retry the call later."),
        _ => None,
    };

    let text = match suggestion {
        Some(s) => format!("{message}\n{s}"),
        None => message.clone(),
    };
    let mut structured = json!({
        "error": err.kind(),
        "message": message,
    });
    if let Some(s) = suggestion {
        structured["suggestion"] = Value::String(s.to_string());
    }

    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(true),
        meta: None,
    }
}

/// Caller-facing text for each failure class.
#[must_use]
pub fn failure_message(err: &StoreError) -> String {
    match err {
        StoreError::Validation(m) => format!("invalid arguments: {m}"),
        StoreError::NotFound { name } => format!("package not found: {name}"),
        StoreError::RateLimited => "snap store rate limit exceeded".to_string(),
        StoreError::Network(m) => format!("snap store unreachable: {m}"),
        StoreError::Malformed(m) => format!("snap store returned a malformed response: {m}"),
        StoreError::Unknown { status } => {
            format!("snap store request failed with HTTP status {status}")
        }
    }
}

fn success(text: String, structured: Value) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    }
}

fn summary_line(p: &PackageSummary) -> String {
    let mut line = format!("- {}", p.name);
    if !p.title.is_empty() {
        let _ = write!(line, " ({})", p.title);
    }
    if !p.summary.is_empty() {
        let _ = write!(line, ": {}", one_line(&p.summary));
    }
    let mut extra = Vec::new();
    if !p.version.is_empty() {
        extra.push(p.version.clone());
    }
    if !p.publisher.is_empty() {
        extra.push(publisher_label(&p.publisher, p.publisher_verified));
    }
    if !extra.is_empty() {
        let _ = write!(line, " [{}]", extra.join(", "));
    }
    line
}

fn publisher_label(publisher: &str, verified: bool) -> String {
    match (publisher.is_empty(), verified) {
        (true, _) => "-".to_string(),
        (false, true) => format!("{publisher} (verified)"),
        (false, false) => publisher.to_string(),
    }
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
