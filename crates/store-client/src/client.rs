//! HTTP client for the Snap Store v2 catalog API.

use crate::decode::{decode_info, decode_search};
use crate::error::{Result, StoreError};
use crate::model::{PackageDetail, PackageIdentifier, PackageSummary, SearchQuery};
use crate::safety::{parse_base_url, redact_url};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_STORE_URL: &str = "https://api.snapcraft.io";
pub const DEFAULT_SERIES: &str = "16";
pub const DEFAULT_ARCHITECTURE: &str = "amd64";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a single response body. The largest real `info` payloads are well under this.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

const SEARCH_FIELDS: &str = "title,summary,publisher,version";
const INFO_FIELDS: &str =
    "title,summary,description,license,publisher,contact,website,store-url,version,revision,confinement,download";

/// The two catalog operations the tool layer depends on.
///
/// Implementations must be cheap to share across tasks; every call is independent.
#[async_trait]
pub trait SnapStore: Send + Sync {
    /// Search the catalog. Results keep the store's ordering.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PackageSummary>>;

    /// Fetch full metadata for one package.
    async fn info(&self, id: &PackageIdentifier) -> Result<PackageDetail>;
}

/// Connection settings for [`SnapStoreClient`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    /// Value of the `Snap-Device-Series` header.
    pub series: String,
    /// Architecture used to filter `channel-map` in `info`.
    pub architecture: String,
    /// Per-request timeout; expiry surfaces as [`StoreError::Network`].
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            series: DEFAULT_SERIES.to_string(),
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct SnapStoreClient {
    inner: Arc<SnapStoreClientInner>,
}

struct SnapStoreClientInner {
    base_url: Url,
    series: String,
    architecture: String,
    client: Client,
}

impl SnapStoreClient {
    /// Build a client from a static config.
    ///
    /// The resulting instance is immutable and safe to share across tasks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the base URL is invalid, `series`/`architecture` are
    /// empty, or the HTTP client cannot be built.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Validation(format!(
                "invalid store URL '{}': cannot be used as a base",
                config.base_url
            )));
        }
        if config.series.trim().is_empty() {
            return Err(StoreError::Validation("series must not be empty".into()));
        }
        if config.architecture.trim().is_empty() {
            return Err(StoreError::Validation(
                "architecture must not be empty".into(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("snap-store-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Validation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(SnapStoreClientInner {
                base_url,
                series: config.series.trim().to_string(),
                architecture: config.architecture.trim().to_string(),
                client,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, not_found_name: Option<&str>) -> Result<Vec<u8>> {
        let redacted = redact_url(&url);
        let response = self
            .inner
            .client
            .get(url)
            .header("Snap-Device-Series", &self.inner.series)
            .send()
            .await
            .inspect_err(|e| warn!(url = %redacted, error = %e, "snap store request failed"))?;

        let status = response.status();
        debug!(url = %redacted, status = status.as_u16(), "snap store response");

        if let Some(err) = classify_status(status, not_found_name) {
            if !matches!(err, StoreError::NotFound { .. }) {
                warn!(url = %redacted, status = status.as_u16(), "snap store returned an error status");
            }
            return Err(err);
        }

        read_body_limited(response, MAX_RESPONSE_BYTES).await
    }
}

#[async_trait]
impl SnapStore for SnapStoreClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PackageSummary>> {
        let mut url = self.endpoint(&["v2", "snaps", "find"]);
        url.query_pairs_mut()
            .append_pair("q", query.as_str())
            .append_pair("fields", SEARCH_FIELDS);

        debug!(query = %query.as_str(), "searching snap store");
        let bytes = self.get(url, None).await?;
        let results = decode_search(&bytes)?;
        debug!(query = %query.as_str(), count = results.len(), "snap store search done");
        Ok(results)
    }

    async fn info(&self, id: &PackageIdentifier) -> Result<PackageDetail> {
        let mut url = self.endpoint(&["v2", "snaps", "info", id.as_str()]);
        url.query_pairs_mut()
            .append_pair("fields", INFO_FIELDS)
            .append_pair("architecture", &self.inner.architecture);

        debug!(package = %id.as_str(), "fetching snap info");
        let bytes = self.get(url, Some(id.as_str())).await?;
        decode_info(&bytes)
    }
}

/// Map a non-success status into the store taxonomy. `None` means "success, read the body".
///
/// `not_found_name` is set for lookups keyed by package name; for search a 404 is just another
/// unexpected status.
fn classify_status(status: StatusCode, not_found_name: Option<&str>) -> Option<StoreError> {
    if status.is_success() {
        return None;
    }
    Some(match (status, not_found_name) {
        (StatusCode::NOT_FOUND, Some(name)) => StoreError::NotFound {
            name: name.to_string(),
        },
        (StatusCode::TOO_MANY_REQUESTS, _) => StoreError::RateLimited,
        _ => StoreError::Unknown {
            status: status.as_u16(),
        },
    })
}

async fn read_body_limited(mut response: reqwest::Response, max: usize) -> Result<Vec<u8>> {
    if let Some(len) = response.content_length()
        && len > max as u64
    {
        return Err(StoreError::Malformed(format!(
            "response too large: {len} bytes (limit {max})"
        )));
    }

    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if out.len().saturating_add(chunk.len()) > max {
            return Err(StoreError::Malformed(format!(
                "response too large: exceeded {max} bytes"
            )));
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use serde_json::{Value, json};
    use snap_store_test_support::{MockServer, pick_unused_port};
    use std::collections::HashMap;

    fn client_for(base_url: &str) -> SnapStoreClient {
        SnapStoreClient::new(StoreConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(2),
            ..StoreConfig::default()
        })
        .expect("valid config")
    }

    #[test]
    fn classify_status_maps_taxonomy() {
        assert_eq!(classify_status(StatusCode::OK, Some("x")), None);
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, Some("x")),
            Some(StoreError::NotFound {
                name: "x".to_string()
            })
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, None),
            Some(StoreError::Unknown { status: 404 })
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, None),
            Some(StoreError::RateLimited)
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, Some("x")),
            Some(StoreError::Unknown { status: 502 })
        );
    }

    #[test]
    fn new_rejects_bad_config() {
        let err = SnapStoreClient::new(StoreConfig {
            base_url: "mailto:someone@example.com".to_string(),
            ..StoreConfig::default()
        })
        .err()
        .expect("must fail");
        assert!(matches!(err, StoreError::Validation(_)));

        let err = SnapStoreClient::new(StoreConfig {
            series: "  ".to_string(),
            ..StoreConfig::default()
        })
        .err()
        .expect("must fail");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn endpoint_encodes_name_as_single_segment_and_keeps_prefix() {
        let client = client_for("http://127.0.0.1:1/prefix/");
        let url = client.endpoint(&["v2", "snaps", "info", "a/b c"]);
        assert_eq!(url.path(), "/prefix/v2/snaps/info/a%2Fb%20c");
    }

    #[tokio::test]
    async fn search_sends_query_fields_and_series_header() {
        async fn find(
            headers: HeaderMap,
            Query(params): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            let series = headers
                .get("snap-device-series")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Json(json!({
                "results": [{
                    "name": params.get("q").cloned().unwrap_or_default(),
                    "snap": {"title": series, "summary": params.get("fields").cloned().unwrap_or_default()}
                }]
            }))
        }

        let server = MockServer::start(Router::new().route("/v2/snaps/find", get(find)))
            .await
            .expect("start mock");
        let client = client_for(&server.base_url());

        let out = client
            .search(&SearchQuery::new("video editor").expect("query"))
            .await
            .expect("search");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "video editor");
        assert_eq!(out[0].title, "16");
        assert_eq!(out[0].summary, SEARCH_FIELDS);
    }

    #[tokio::test]
    async fn info_maps_404_and_429() {
        async fn info(Path(name): Path<String>) -> (AxumStatus, Json<Value>) {
            match name.as_str() {
                "busy" => (AxumStatus::TOO_MANY_REQUESTS, Json(json!({}))),
                "broken" => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))),
                _ => (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"error-list": [{"code": "resource-not-found"}]})),
                ),
            }
        }

        let server = MockServer::start(Router::new().route("/v2/snaps/info/{name}", get(info)))
            .await
            .expect("start mock");
        let client = client_for(&server.base_url());

        let id = |n: &str| PackageIdentifier::new(n).expect("id");
        assert_eq!(
            client.info(&id("nope")).await.unwrap_err(),
            StoreError::NotFound {
                name: "nope".to_string()
            }
        );
        assert_eq!(
            client.info(&id("busy")).await.unwrap_err(),
            StoreError::RateLimited
        );
        assert_eq!(
            client.info(&id("broken")).await.unwrap_err(),
            StoreError::Unknown { status: 500 }
        );
    }

    #[tokio::test]
    async fn info_with_malformed_body_is_malformed() {
        let app = Router::new().route(
            "/v2/snaps/info/{name}",
            get(|| async { "{\"name\": \"firefox\", \"snap\": " }),
        );
        let server = MockServer::start(app).await.expect("start mock");
        let client = client_for(&server.base_url());

        let err = client
            .info(&PackageIdentifier::new("firefox").expect("id"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)), "{err}");
    }

    #[tokio::test]
    async fn unreachable_store_is_network_error() {
        let port = pick_unused_port().expect("port");
        let client = client_for(&format!("http://127.0.0.1:{port}"));

        let err = client
            .search(&SearchQuery::new("browser").expect("query"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Network(_)), "{err}");
    }

    #[tokio::test]
    async fn slow_store_times_out_as_network_error() {
        let app = Router::new().route(
            "/v2/snaps/find",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"results": []}))
            }),
        );
        let server = MockServer::start(app).await.expect("start mock");
        let client = SnapStoreClient::new(StoreConfig {
            base_url: server.base_url(),
            timeout: Duration::from_millis(200),
            ..StoreConfig::default()
        })
        .expect("valid config");

        let err = client
            .search(&SearchQuery::new("browser").expect("query"))
            .await
            .unwrap_err();
        match err {
            StoreError::Network(msg) => assert!(msg.contains("timed out"), "{msg}"),
            other => panic!("expected network error, got {other}"),
        }
    }
}
