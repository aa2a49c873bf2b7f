//! Defensive decoding of Snap Store v2 JSON payloads.
//!
//! Bodies are parsed into `serde_json::Value` and projected by hand instead of being deserialized
//! into fixed structs: the store adds fields freely, and optional metadata is often absent.
//! Unknown fields are ignored. Optional scalars default to empty strings. Missing *structural*
//! fields yield [`StoreError::Malformed`] so a caller never sees a half-filled entity.

use crate::error::{Result, StoreError};
use crate::model::{ChannelRelease, PackageDetail, PackageSummary};
use serde_json::{Map, Value};

const STORE_WEB_BASE: &str = "https://snapcraft.io";

/// Decode a `/v2/snaps/find` body.
///
/// The body is either `{"results": [...]}` or a bare array of entries. Entries that are not JSON
/// objects are skipped.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the body is not JSON, or is an object without a `results`
/// array.
pub fn decode_search(bytes: &[u8]) -> Result<Vec<PackageSummary>> {
    let body = parse_json(bytes)?;
    let results = match &body {
        Value::Array(entries) => entries,
        other => other
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                StoreError::Malformed("search response has no `results` array".into())
            })?,
    };

    Ok(results
        .iter()
        .filter_map(Value::as_object)
        .map(summary_from_entry)
        .collect())
}

/// Decode a `/v2/snaps/info/{name}` body.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the body is not JSON, lacks `name` or `snap`, or carries a
/// `channel-map` that is not an array of channel objects.
pub fn decode_info(bytes: &[u8]) -> Result<PackageDetail> {
    let body = parse_json(bytes)?;
    let root = body
        .as_object()
        .ok_or_else(|| StoreError::Malformed("info response is not a JSON object".into()))?;

    let name = root
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::Malformed("info response has no `name`".into()))?
        .to_string();
    let snap = root
        .get("snap")
        .and_then(Value::as_object)
        .ok_or_else(|| StoreError::Malformed(format!("info response for '{name}' has no `snap`")))?;

    let channels = match root.get("channel-map") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, e)| channel_from_entry(&name, i, e))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(StoreError::Malformed(format!(
                "info response for '{name}' has a non-array `channel-map`"
            )));
        }
    };

    let version = default_version(&channels);
    let (publisher, publisher_verified) = publisher_of(snap);
    let store_url = match str_field(snap, "store-url") {
        s if s.is_empty() => format!("{STORE_WEB_BASE}/{name}"),
        s => s,
    };

    Ok(PackageDetail {
        snap_id: str_field(root, "snap-id"),
        title: str_field(snap, "title"),
        summary: str_field(snap, "summary"),
        description: str_field(snap, "description"),
        version,
        license: str_field(snap, "license"),
        publisher,
        publisher_verified,
        contact: str_field(snap, "contact"),
        website: str_field(snap, "website"),
        store_url,
        channels,
        name,
    })
}

fn parse_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Malformed(format!("response body is not valid JSON: {e}")))
}

fn summary_from_entry(entry: &Map<String, Value>) -> PackageSummary {
    let empty = Map::new();
    let snap = entry.get("snap").and_then(Value::as_object).unwrap_or(&empty);
    let (publisher, publisher_verified) = publisher_of(snap);
    let version = entry
        .get("revision")
        .and_then(Value::as_object)
        .map(|r| str_field(r, "version"))
        .unwrap_or_default();

    PackageSummary {
        name: str_field(entry, "name"),
        title: str_field(snap, "title"),
        summary: str_field(snap, "summary"),
        publisher,
        publisher_verified,
        version,
    }
}

fn channel_from_entry(name: &str, index: usize, entry: &Value) -> Result<ChannelRelease> {
    let malformed = || {
        StoreError::Malformed(format!(
            "info response for '{name}' has an invalid channel-map entry at index {index}"
        ))
    };
    let entry = entry.as_object().ok_or_else(malformed)?;
    let channel = entry
        .get("channel")
        .and_then(Value::as_object)
        .ok_or_else(malformed)?;

    let track = str_field(channel, "track");
    let risk = str_field(channel, "risk");
    let full = if track.is_empty() || risk.is_empty() {
        str_field(channel, "name")
    } else {
        format!("{track}/{risk}")
    };

    Ok(ChannelRelease {
        channel: full,
        architecture: str_field(channel, "architecture"),
        released_at: str_field(channel, "released-at"),
        track,
        risk,
        version: str_field(entry, "version"),
        revision: entry.get("revision").and_then(Value::as_u64),
        confinement: str_field(entry, "confinement"),
        size_bytes: entry
            .get("download")
            .and_then(|d| d.get("size"))
            .and_then(Value::as_u64),
    })
}

fn default_version(channels: &[ChannelRelease]) -> String {
    channels
        .iter()
        .find(|c| c.channel == "latest/stable")
        .or_else(|| channels.first())
        .map(|c| c.version.clone())
        .unwrap_or_default()
}

fn publisher_of(snap: &Map<String, Value>) -> (String, bool) {
    let Some(p) = snap.get("publisher").and_then(Value::as_object) else {
        return (String::new(), false);
    };
    let display = match str_field(p, "display-name") {
        s if s.is_empty() => str_field(p, "username"),
        s => s,
    };
    let verified = p.get("validation").and_then(Value::as_str) == Some("verified");
    (display, verified)
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
