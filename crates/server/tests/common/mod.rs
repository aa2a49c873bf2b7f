#![allow(dead_code, unused_imports)]

use anyhow::Context as _;
use std::process::{Child, Command};
use std::time::Duration;

pub use snap_store_test_support::KillOnDrop;

pub fn pick_unused_port() -> anyhow::Result<u16> {
    snap_store_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    snap_store_test_support::wait_http_ok(url, timeout_dur).await
}

pub fn server_bin() -> &'static str {
    env!("CARGO_BIN_EXE_snap-store-mcp")
}

pub fn spawn_http_server(config_path: &std::path::Path, port: u16) -> anyhow::Result<Child> {
    Command::new(server_bin())
        .arg("--config")
        .arg(config_path)
        .arg("--transport")
        .arg("http")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .spawn()
        .context("spawn snap-store-mcp")
}
