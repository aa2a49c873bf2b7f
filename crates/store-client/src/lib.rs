//! Typed client for the Snap Store catalog API.
//!
//! This crate is intended to be used by `snap-store-mcp`, which exposes the two operations here
//! (`search` and `info`) as MCP tools.
//!
//! It intentionally contains **no** MCP logic: it only issues HTTP requests, decodes the JSON
//! defensively and maps failures into the closed [`error::StoreError`] taxonomy.

pub mod client;
pub mod decode;
pub mod error;
pub mod model;
pub mod safety;

pub use client::{SnapStore, SnapStoreClient, StoreConfig};
pub use error::{Result, StoreError};
pub use model::{ChannelRelease, PackageDetail, PackageIdentifier, PackageSummary, SearchQuery};
