use anyhow::Context as _;
use clap::Parser as _;
use snap_store_client::safety::redact_url;
use snap_store_mcp::config::{Cli, ServerConfig, TransportKind};
use snap_store_mcp::service::SnapStoreService;
use snap_store_mcp::telemetry::init_tracing;
use snap_store_mcp::transport::{serve_http, serve_stdio};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let config = ServerConfig::resolve(&cli).context("load configuration")?;
    let client = config.build_client().context("build snap store client")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        store = %redact_url(client.base_url()),
        series = %config.store.series,
        architecture = %config.store.architecture,
        timeout_secs = config.store.timeout.as_secs(),
        transport = ?config.transport,
        "starting snap-store-mcp"
    );

    let service = SnapStoreService::new(Arc::new(client));
    match config.transport {
        TransportKind::Stdio => serve_stdio(service).await.context("stdio transport")?,
        TransportKind::Http => serve_http(service, config.bind)
            .await
            .context("http transport")?,
    }

    Ok(())
}
