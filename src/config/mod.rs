use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;
use crate::search::{Bucket, Provider};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub search: SearchDefaults,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Default search settings applied to a fresh session
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub provider: Provider,
    pub k: usize,
    pub lambda: f64,
    pub sigma: f64,
    pub buckets: Vec<Bucket>,
    pub contrarian: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/trails.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let provider = match env::var("SEARCH_PROVIDER") {
            Ok(name) => Provider::from_str(&name).map_err(|message| AppError::Config { message })?,
            Err(_) => Provider::default(),
        };

        let buckets = match env::var("SEARCH_BUCKETS") {
            Ok(list) => parse_buckets(&list).map_err(|message| AppError::Config { message })?,
            Err(_) => Bucket::ALL.to_vec(),
        };

        let search = SearchDefaults {
            provider,
            k: env::var("SEARCH_K")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            lambda: env::var("SEARCH_LAMBDA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.6),
            sigma: env::var("SEARCH_SIGMA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.5),
            buckets,
            contrarian: env::var("SEARCH_CONTRARIAN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        Ok(Config {
            database,
            logging,
            search,
        })
    }
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            k: 8,
            lambda: 0.6,
            sigma: 0.5,
            buckets: Bucket::ALL.to_vec(),
            contrarian: false,
        }
    }
}

fn parse_buckets(list: &str) -> Result<Vec<Bucket>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Bucket::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let defaults = SearchDefaults::default();
        assert_eq!(defaults.provider, Provider::Parallel);
        assert_eq!(defaults.k, 8);
        assert_eq!(defaults.lambda, 0.6);
        assert_eq!(defaults.sigma, 0.5);
        assert_eq!(defaults.buckets.len(), 6);
        assert!(!defaults.contrarian);
    }

    #[test]
    fn test_parse_buckets() {
        let buckets = parse_buckets("primary, news").unwrap();
        assert_eq!(buckets, vec![Bucket::Primary, Bucket::News]);

        assert!(parse_buckets("primary, glossy-magazine").is_err());
    }
}
