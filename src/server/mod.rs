//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state: search settings and the active trail

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::search::{FixtureSearch, SearchParams};
use crate::storage::SqliteStorage;
use crate::tangents::PoolTangents;
use crate::trail::Trail;

/// Mutable session state: the knobs a user can turn plus the single
/// active trail.
///
/// The trail slot has two states — unset (no active trail) and active.
/// Starting, loading, or importing a trail replaces the slot wholesale;
/// the prior trail is superseded, never merged.
#[derive(Debug, Clone)]
pub struct ExplorationSession {
    /// Current search settings, used to fill omitted search parameters.
    pub settings: SearchParams,
    /// The active trail, if any.
    pub trail: Option<Trail>,
}

impl ExplorationSession {
    fn from_config(config: &Config) -> Self {
        Self {
            settings: SearchParams {
                provider: config.search.provider,
                k: config.search.k,
                lambda: config.search.lambda,
                sigma: config.search.sigma,
                buckets: config.search.buckets.clone(),
                contrarian: config.search.contrarian,
            },
            trail: None,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// SQLite storage backend for trail persistence.
    pub storage: SqliteStorage,
    /// Search collaborator.
    pub search: FixtureSearch,
    /// Tangent-generation collaborator.
    pub tangents: PoolTangents,
    /// Session state behind a lock; the trail is single-writer, so the
    /// lock only guards handler interleaving.
    pub session: Mutex<ExplorationSession>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Config,
        storage: SqliteStorage,
        search: FixtureSearch,
        tangents: PoolTangents,
    ) -> Self {
        let session = ExplorationSession::from_config(&config);
        Self {
            config,
            storage,
            search,
            tangents,
            session: Mutex::new(session),
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LogFormat, LoggingConfig, SearchDefaults};
    use crate::search::Provider;
    use std::path::PathBuf;

    fn create_test_config() -> Config {
        Config {
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            search: SearchDefaults::default(),
        }
    }

    async fn create_test_state() -> AppState {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        AppState::new(
            create_test_config(),
            storage,
            FixtureSearch::new(),
            PoolTangents::new(),
        )
    }

    #[tokio::test]
    async fn test_session_starts_unset() {
        let state = create_test_state().await;
        let session = state.session.lock().await;

        assert!(session.trail.is_none());
        assert_eq!(session.settings.provider, Provider::Parallel);
        assert_eq!(session.settings.k, 8);
    }

    #[tokio::test]
    async fn test_shared_state_type() {
        let state = create_test_state().await;
        let shared: SharedState = Arc::new(state);

        let shared2 = Arc::clone(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(shared2);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[tokio::test]
    async fn test_session_settings_follow_config() {
        let mut config = create_test_config();
        config.search.k = 3;
        config.search.contrarian = true;

        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let state = AppState::new(config, storage, FixtureSearch::new(), PoolTangents::new());

        let session = state.session.lock().await;
        assert_eq!(session.settings.k, 3);
        assert!(session.settings.contrarian);
    }
}
