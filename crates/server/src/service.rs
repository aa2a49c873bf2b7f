//! MCP `ServerHandler` wiring for the tool gateway.

use crate::tools::{GatewayError, ToolGateway};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use snap_store_client::SnapStore;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Snap Store MCP server. Use 'search_snaps' to find snap packages by \
name, category or keyword, then 'snap_info' with an exact package name for details.";

/// The MCP service: a thin adapter from `rmcp` requests to [`ToolGateway`].
#[derive(Clone)]
pub struct SnapStoreService {
    gateway: ToolGateway,
}

impl SnapStoreService {
    #[must_use]
    pub fn new(store: Arc<dyn SnapStore>) -> Self {
        Self {
            gateway: ToolGateway::new(store),
        }
    }
}

impl ServerHandler for SnapStoreService {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = "snap-store-mcp".to_string();
        server_info.title = Some("Snap Store".to_string());
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = server_info;
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.gateway.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.gateway
            .call_tool(&request.name, request.arguments.as_ref(), &context.ct)
            .await
            .map_err(|e| match e {
                GatewayError::UnknownTool(_) => McpError::invalid_params(e.to_string(), None),
            })
    }
}
