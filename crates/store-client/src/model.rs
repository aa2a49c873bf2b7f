//! Request and result types.

use crate::error::{Result, StoreError};
use serde::Serialize;

/// A validated, trimmed search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
}

impl SearchQuery {
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `query` is empty or whitespace-only.
    pub fn new(query: &str) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StoreError::Validation(
                "`query` must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.query
    }
}

/// A validated, trimmed package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentifier {
    package_name: String,
}

impl PackageIdentifier {
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `package_name` is empty or whitespace-only.
    pub fn new(package_name: &str) -> Result<Self> {
        let package_name = package_name.trim();
        if package_name.is_empty() {
            return Err(StoreError::Validation(
                "`package_name` must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            package_name: package_name.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.package_name
    }
}

/// One entry of a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: String,
    pub title: String,
    pub summary: String,
    /// Publisher display name.
    pub publisher: String,
    pub publisher_verified: bool,
    /// Version of the default release, as reported by search.
    pub version: String,
}

/// Full metadata for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetail {
    pub name: String,
    pub snap_id: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    /// Version of the `latest/stable` release, falling back to the first listed channel.
    pub version: String,
    pub license: String,
    pub publisher: String,
    pub publisher_verified: bool,
    pub contact: String,
    pub website: String,
    pub store_url: String,
    pub channels: Vec<ChannelRelease>,
}

/// One `channel-map` entry: what is released where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRelease {
    /// Full channel name, e.g. `latest/stable`.
    pub channel: String,
    pub track: String,
    pub risk: String,
    pub architecture: String,
    pub version: String,
    pub revision: Option<u64>,
    pub confinement: String,
    pub released_at: String,
    pub size_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_trims_input() {
        let q = SearchQuery::new("  video editor \n").expect("valid");
        assert_eq!(q.as_str(), "video editor");
    }

    #[test]
    fn blank_inputs_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            assert!(matches!(
                SearchQuery::new(raw),
                Err(StoreError::Validation(_))
            ));
            assert!(matches!(
                PackageIdentifier::new(raw),
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn summary_serializes_camel_case() {
        let s = PackageSummary {
            name: "firefox".to_string(),
            title: "Firefox".to_string(),
            summary: "Mozilla Firefox web browser".to_string(),
            publisher: "Mozilla".to_string(),
            publisher_verified: true,
            version: "131.0".to_string(),
        };
        let v = serde_json::to_value(&s).expect("serialize");
        assert_eq!(v["publisherVerified"], serde_json::json!(true));
    }
}
