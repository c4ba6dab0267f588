//! Storage configuration.
//!
//! # Responsibility
//! - Select the storage backend and its connection settings.
//! - Read settings from the process environment.
//!
//! # Invariants
//! - An unset or empty `DATABASE_URL` selects the in-memory backend.
//! - Invalid values are rejected instead of silently defaulted.

use crate::db::DatabaseOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BUSY_TIMEOUT_ENV: &str = "PRODDX_BUSY_TIMEOUT_MS";
pub const QUERY_TIMEOUT_ENV: &str = "PRODDX_QUERY_TIMEOUT_MS";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedDatabaseUrl(String),
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDatabaseUrl(url) => write!(
                f,
                "unsupported database url `{url}`; expected `memory` or `sqlite://<path>`"
            ),
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    Memory,
    Sqlite { path: PathBuf },
}

impl Default for Backend {
    fn default() -> Self {
        Self::Memory
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    pub busy_timeout_ms: u64,
    /// Per-operation deadline for the SQLite backend; `None` disables it.
    pub query_timeout_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            query_timeout_ms: None,
        }
    }
}

impl StorageConfig {
    /// Reads `DATABASE_URL`, `PRODDX_BUSY_TIMEOUT_MS` and `PRODDX_QUERY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_ENV) {
            config.backend = parse_database_url(&url)?;
        }
        if let Some(value) = lookup(BUSY_TIMEOUT_ENV) {
            config.busy_timeout_ms = parse_millis(BUSY_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(QUERY_TIMEOUT_ENV) {
            config.query_timeout_ms = Some(parse_millis(QUERY_TIMEOUT_ENV, &value)?);
        }

        Ok(config)
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            query_timeout: self.query_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Maps a database URL onto a backend.
///
/// `memory`, `:memory:` and the empty string select the in-memory backend;
/// `sqlite://<path>`, `file:<path>` and bare paths select a SQLite file.
pub fn parse_database_url(url: &str) -> Result<Backend, ConfigError> {
    let trimmed = url.trim();
    match trimmed {
        "" | "memory" | ":memory:" => return Ok(Backend::Memory),
        _ => {}
    }

    if let Some(path) = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("file:"))
    {
        if path.is_empty() {
            return Err(ConfigError::UnsupportedDatabaseUrl(trimmed.to_string()));
        }
        return Ok(Backend::Sqlite {
            path: PathBuf::from(path),
        });
    }

    if trimmed.contains("://") {
        return Err(ConfigError::UnsupportedDatabaseUrl(trimmed.to_string()));
    }

    Ok(Backend::Sqlite {
        path: PathBuf::from(trimmed),
    })
}

fn parse_millis(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}
