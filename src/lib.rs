//! # Trailhead
//!
//! An MCP (Model Context Protocol) server for exploration trails: issue a
//! search query, open source cards, branch into tangents, and accumulate a
//! session trail with a derived exploration score.
//!
//! ## Features
//!
//! - **Trail Engine**: append-only step ledger with derived metrics and a
//!   deterministic exploration score
//! - **Source Search**: bucket-diversified source cards behind a provider
//!   trait (fixture-backed by default)
//! - **Tangents**: follow-up query suggestions for any source card
//! - **Sharing**: lossless trail export/import and fetch-by-id, with all
//!   derived values recomputed on load
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (stdio) → Trail Engine (pure)
//!                    ↓
//!              SQLite (trail ledger, fire-and-forget)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trailhead::{AppState, Config, McpServer};
//! use trailhead::search::FixtureSearch;
//! use trailhead::storage::SqliteStorage;
//! use trailhead::tangents::PoolTangents;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let state = Arc::new(AppState::new(
//!         config,
//!         storage,
//!         FixtureSearch::new(),
//!         PoolTangents::new(),
//!     ));
//!     let server = McpServer::new(state);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management for the server.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Search collaborator: source cards, buckets, and providers.
pub mod search;
/// MCP server implementation and request handling.
pub mod server;
/// SQLite storage layer for trail persistence.
pub mod storage;
/// Tangent-generation collaborator.
pub mod tangents;
/// Trail engine: step ledger, metrics, and exploration score.
pub mod trail;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
pub use trail::{exploration_score, Trail, TrailMetrics, TrailStep};
