use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Trail error: {0}")]
    Trail(#[from] TrailError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("MCP protocol error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Trail engine errors
#[derive(Debug, Error)]
pub enum TrailError {
    #[error("Malformed trail data: {message}")]
    MalformedTrailData { message: String },

    #[error("Trail serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Trail not found: {trail_id}")]
    TrailNotFound { trail_id: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Search collaborator errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Unknown provider: {name}")]
    UnknownProvider { name: String },

    #[error("Provider failed: {message}")]
    Provider { message: String },
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        RpcError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for trail engine operations
pub type TrailResult<T> = Result<T, TrailError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type alias for MCP operations
pub type RpcResult<T> = Result<T, RpcError>;
