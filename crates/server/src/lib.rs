//! Snap Store MCP server.
//!
//! Exposes two read-only tools over the Model Context Protocol:
//!
//! - `search_snaps` - search the Snap Store catalog
//! - `snap_info` - full metadata for one package
//!
//! Each tool call maps to exactly one request made through `snap-store-client`. The server holds
//! no state between calls.

pub mod config;
pub mod error;
pub mod render;
pub mod service;
pub mod telemetry;
pub mod tools;
pub mod transport;

pub use error::{Result, ServerError};
pub use service::SnapStoreService;
pub use tools::{ToolGateway, ToolRegistry};
