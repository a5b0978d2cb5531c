//! Storage layer for trail persistence.
//!
//! Records trails and their step ledgers in SQLite. The engine itself
//! never waits on this layer: step writes triggered by an in-memory
//! append are dispatched fire-and-forget by the server, and a write
//! failure is logged rather than surfaced.

mod sqlite;

pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::trail::{Trail, TrailStep};

/// Storage trait for trail persistence operations.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Record a newly started trail (including any steps it already carries).
    async fn create_trail(&self, trail: &Trail) -> StorageResult<()>;

    /// Store a complete trail snapshot, replacing any prior record with
    /// the same id. Used when an imported or shared trail enters the system.
    async fn save_trail(&self, trail: &Trail) -> StorageResult<()>;

    /// Fetch a trail with its steps in insertion order, or `None` when
    /// the id is unknown.
    async fn get_trail(&self, id: &str) -> StorageResult<Option<Trail>>;

    /// Append one step to a stored trail's ledger.
    ///
    /// Fails with [`crate::error::StorageError::TrailNotFound`] when the
    /// trail id is unknown.
    async fn append_step(&self, trail_id: &str, step: &TrailStep) -> StorageResult<()>;
}
