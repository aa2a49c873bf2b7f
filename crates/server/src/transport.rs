//! Transports: stdio (default) and streamable HTTP.

use crate::error::{Result, ServerError};
use crate::service::SnapStoreService;
use axum::Router;
use axum::routing::get;
use rmcp::ServiceExt as _;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::net::SocketAddr;
use tracing::info;

/// Serve MCP over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns an error if the MCP handshake fails or the service task terminates abnormally.
pub async fn serve_stdio(service: SnapStoreService) -> Result<()> {
    let running = service
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::Startup(format!("MCP stdio handshake failed: {e}")))?;

    info!("MCP server running on stdio");
    let reason = running
        .waiting()
        .await
        .map_err(|e| ServerError::Runtime(format!("MCP service task failed: {e}")))?;
    info!(?reason, "MCP stdio session ended");
    Ok(())
}

/// Build the HTTP app: streamable HTTP MCP at `/mcp`, liveness at `/health`.
pub fn http_router(service: SnapStoreService) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(service.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp)
}

/// Serve MCP over streamable HTTP on `bind` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_http(service: SnapStoreService, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| ServerError::Startup(format!("failed to bind {bind}: {e}")))?;
    let local = listener.local_addr()?;
    info!(addr = %local, "MCP server listening (streamable HTTP at /mcp)");

    axum::serve(listener, http_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("MCP HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
