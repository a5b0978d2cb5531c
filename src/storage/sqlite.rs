use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use super::Storage;
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::trail::{Trail, TrailStep};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create an in-memory storage instance, used by tests
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .foreign_keys(true);

        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_steps(&self, trail_id: &str, steps: &[TrailStep]) -> StorageResult<()> {
        for (position, step) in steps.iter().enumerate() {
            let payload = encode_step(step)?;
            sqlx::query(
                r#"
                INSERT INTO trail_steps (trail_id, position, step, recorded_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(trail_id)
            .bind(position as i64)
            .bind(&payload)
            .bind(step.ts().to_rfc3339())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_trail(&self, trail: &Trail) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trails (id, query, created_at, score)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&trail.id)
        .bind(&trail.query)
        .bind(trail.created_at.to_rfc3339())
        .bind(trail.score as i64)
        .execute(&self.pool)
        .await?;

        self.insert_steps(&trail.id, &trail.steps).await
    }

    async fn save_trail(&self, trail: &Trail) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trails (id, query, created_at, score)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE
            SET query = excluded.query,
                created_at = excluded.created_at,
                score = excluded.score
            "#,
        )
        .bind(&trail.id)
        .bind(&trail.query)
        .bind(trail.created_at.to_rfc3339())
        .bind(trail.score as i64)
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM trail_steps WHERE trail_id = ?")
            .bind(&trail.id)
            .execute(&self.pool)
            .await?;

        self.insert_steps(&trail.id, &trail.steps).await
    }

    async fn get_trail(&self, id: &str) -> StorageResult<Option<Trail>> {
        let row: Option<TrailRow> = sqlx::query_as(
            r#"
            SELECT id, query, created_at, score
            FROM trails
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let step_rows: Vec<StepRow> = sqlx::query_as(
            r#"
            SELECT step
            FROM trail_steps
            WHERE trail_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut steps = Vec::with_capacity(step_rows.len());
        for step_row in step_rows {
            steps.push(decode_step(&step_row.step)?);
        }

        let mut trail: Trail = row.into();
        trail.steps = steps;
        Ok(Some(trail))
    }

    async fn append_step(&self, trail_id: &str, step: &TrailStep) -> StorageResult<()> {
        let payload = encode_step(step)?;

        let result = sqlx::query(
            r#"
            INSERT INTO trail_steps (trail_id, position, step, recorded_at)
            SELECT id, (SELECT COUNT(*) FROM trail_steps WHERE trail_id = ?), ?, ?
            FROM trails
            WHERE id = ?
            "#,
        )
        .bind(trail_id)
        .bind(&payload)
        .bind(step.ts().to_rfc3339())
        .bind(trail_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::TrailNotFound {
                trail_id: trail_id.to_string(),
            });
        }

        Ok(())
    }
}

fn encode_step(step: &TrailStep) -> StorageResult<String> {
    serde_json::to_string(step).map_err(|e| StorageError::Query {
        message: format!("Failed to encode step: {}", e),
    })
}

fn decode_step(payload: &str) -> StorageResult<TrailStep> {
    serde_json::from_str(payload).map_err(|e| StorageError::Query {
        message: format!("Failed to decode step: {}", e),
    })
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct TrailRow {
    id: String,
    query: String,
    created_at: String,
    score: i64,
}

impl From<TrailRow> for Trail {
    fn from(row: TrailRow) -> Self {
        use chrono::DateTime;

        Self {
            id: row.id,
            query: row.query,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            steps: Vec::new(),
            score: row.score.max(0) as u32,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StepRow {
    step: String,
}
