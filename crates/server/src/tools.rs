//! Tool registration table and the gateway that executes tool calls.
//!
//! The registry is built once at startup and never mutated. The gateway validates arguments,
//! performs exactly one store call per tool invocation and renders the outcome. Validation and
//! store failures are tool *content* (`is_error = true`); only an unknown tool name is a
//! protocol-level error.

use crate::render;
use rmcp::model::{CallToolResult, JsonObject, Tool, ToolAnnotations};
use serde_json::{Value, json};
use snap_store_client::{PackageIdentifier, SearchQuery, SnapStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const SEARCH_SNAPS: &str = "search_snaps";
pub const SNAP_INFO: &str = "snap_info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SearchSnaps,
    SnapInfo,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// One registered tool: its MCP surface and which handler runs it.
#[derive(Debug, Clone)]
struct ToolEntry {
    kind: ToolKind,
    name: &'static str,
    title: &'static str,
    description: &'static str,
    argument: &'static str,
    argument_description: &'static str,
}

impl ToolEntry {
    fn input_schema(&self) -> JsonObject {
        let schema = json!({
            "type": "object",
            "properties": {
                self.argument: {
                    "type": "string",
                    "description": self.argument_description,
                }
            },
            "required": [self.argument],
        });
        schema.as_object().cloned().unwrap_or_else(JsonObject::new)
    }

    /// Shape of `structured_content` on success.
    fn output_schema(&self) -> JsonObject {
        let schema = match self.kind {
            ToolKind::SearchSnaps => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "results": { "type": "array", "items": summary_schema() },
                },
                "required": ["query", "results"],
            }),
            ToolKind::SnapInfo => json!({
                "type": "object",
                "properties": { "package": detail_schema() },
                "required": ["package"],
            }),
        };
        schema.as_object().cloned().unwrap_or_else(JsonObject::new)
    }

    fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(self.name, self.description, Arc::new(self.input_schema()));
        tool.output_schema = Some(Arc::new(self.output_schema()));
        // Both tools issue a single GET against an external catalog.
        tool.annotations = Some(ToolAnnotations {
            title: Some(self.title.to_string()),
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint: Some(true),
        });
        tool
    }
}

fn summary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "publisher": { "type": "string" },
            "publisherVerified": { "type": "boolean" },
            "version": { "type": "string" },
        },
        "required": ["name"],
    })
}

fn detail_schema() -> Value {
    let string = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "name": string,
            "snapId": string,
            "title": string,
            "summary": string,
            "description": string,
            "version": string,
            "license": string,
            "publisher": string,
            "publisherVerified": { "type": "boolean" },
            "contact": string,
            "website": string,
            "storeUrl": string,
            "channels": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "channel": string,
                        "track": string,
                        "risk": string,
                        "architecture": string,
                        "version": string,
                        "revision": { "type": ["integer", "null"] },
                        "confinement": string,
                        "releasedAt": string,
                        "sizeBytes": { "type": ["integer", "null"] },
                    },
                    "required": ["channel"],
                },
            },
        },
        "required": ["name", "channels"],
    })
}

/// Tool name → handler + schema.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
}

impl ToolRegistry {
    /// The two Snap Store tools.
    #[must_use]
    pub fn snap_tools() -> Self {
        Self {
            entries: vec![
                ToolEntry {
                    kind: ToolKind::SearchSnaps,
                    name: SEARCH_SNAPS,
                    title: "Search Snaps",
                    description: "Search for snap packages in the Snap Store by name, category, or keywords. Returns matching packages even if the query doesn't exactly match a package name.",
                    argument: "query",
                    argument_description: "Search query - can be a package name, category, or keywords (e.g., 'browser', 'video editor', 'python', 'game')",
                },
                ToolEntry {
                    kind: ToolKind::SnapInfo,
                    name: SNAP_INFO,
                    title: "Snap Info",
                    description: "Get detailed information about a specific snap package: publisher, license, description and released channels.",
                    argument: "package_name",
                    argument_description: "Exact snap package name (e.g., 'firefox')",
                },
            ],
        }
    }

    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.entries.iter().map(ToolEntry::to_tool).collect()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ToolKind> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.kind)
    }
}

/// Executes tool calls against a [`SnapStore`].
///
/// Holds no mutable state; clones share the store and the registry.
#[derive(Clone)]
pub struct ToolGateway {
    store: Arc<dyn SnapStore>,
    registry: Arc<ToolRegistry>,
}

impl ToolGateway {
    #[must_use]
    pub fn new(store: Arc<dyn SnapStore>) -> Self {
        Self {
            store,
            registry: Arc::new(ToolRegistry::snap_tools()),
        }
    }

    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list_tools()
    }

    /// Run one tool call.
    ///
    /// If `cancel` fires before the store answers, the in-flight request is dropped and a
    /// network-failure result is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownTool`] if `name` is not registered.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
        cancel: &CancellationToken,
    ) -> Result<CallToolResult, GatewayError> {
        let kind = self
            .registry
            .lookup(name)
            .ok_or_else(|| GatewayError::UnknownTool(name.to_string()))?;

        let call = async {
            match kind {
                ToolKind::SearchSnaps => self.search_snaps(arguments).await,
                ToolKind::SnapInfo => self.snap_info(arguments).await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(tool = %name, "tool call cancelled");
                Ok(render::failure(&StoreError::Network("request cancelled".to_string())))
            }
            result = call => Ok(result),
        }
    }

    /// `search_snaps({query})`.
    pub async fn search_snaps(&self, arguments: Option<&JsonObject>) -> CallToolResult {
        let query = match required_string(arguments, "query").and_then(SearchQuery::new) {
            Ok(q) => q,
            Err(e) => return rejected(SEARCH_SNAPS, &e),
        };

        match self.store.search(&query).await {
            Ok(results) => render::search_listing(query.as_str(), &results),
            Err(e) => failed(SEARCH_SNAPS, &e),
        }
    }

    /// `snap_info({package_name})`.
    pub async fn snap_info(&self, arguments: Option<&JsonObject>) -> CallToolResult {
        let id = match required_string(arguments, "package_name").and_then(PackageIdentifier::new)
        {
            Ok(id) => id,
            Err(e) => return rejected(SNAP_INFO, &e),
        };

        match self.store.info(&id).await {
            Ok(detail) => render::package_detail(&detail),
            Err(e) => failed(SNAP_INFO, &e),
        }
    }
}

fn required_string<'a>(
    arguments: Option<&'a JsonObject>,
    key: &str,
) -> Result<&'a str, StoreError> {
    match arguments.and_then(|a| a.get(key)) {
        None | Some(Value::Null) => Err(StoreError::Validation(format!(
            "missing required argument `{key}`"
        ))),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(StoreError::Validation(format!(
            "argument `{key}` must be a string"
        ))),
    }
}

fn rejected(tool: &str, err: &StoreError) -> CallToolResult {
    debug!(tool, error = %err, "tool arguments rejected");
    render::failure(err)
}

fn failed(tool: &str, err: &StoreError) -> CallToolResult {
    info!(tool, kind = err.kind(), error = %err, "tool call failed");
    render::failure(err)
}
