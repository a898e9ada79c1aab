//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use knockout::db::DatabaseConfig;
use std::net::SocketAddr;
use std::str::FromStr;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Which store backs the managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL through [`knockout::db::PgStore`]
    Postgres,
    /// Process-local [`knockout::db::MemoryStore`]; data is lost on exit
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND".to_string(),
                reason: format!("Unknown backend '{other}', expected 'postgres' or 'memory'"),
            }),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Store backend
    pub backend: StoreBackend,
    /// Database configuration, used by the Postgres backend
    pub database: DatabaseConfig,
    /// Fixed seed for bracket shuffling; random order when absent
    pub bracket_seed: Option<u64>,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub memory: bool,
    pub bracket_seed: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let backend = if overrides.memory {
            StoreBackend::Memory
        } else {
            parse_env("STORE_BACKEND")?.unwrap_or(StoreBackend::Postgres)
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = overrides.database_url {
            database.database_url = url;
        }

        let bracket_seed = match overrides.bracket_seed {
            Some(seed) => Some(seed),
            None => parse_env("BRACKET_SEED")?,
        };

        Ok(ServerConfig {
            bind,
            backend,
            database,
            bracket_seed,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }

        if !self.database.database_url.starts_with("postgres://")
            && !self.database.database_url.starts_with("postgresql://")
        {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must be a postgres:// or postgresql:// URL".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Default {DEFAULT_BIND} is not a socket address"),
    })
}

/// Parse a variable if it is set; a set but malformed value is an error
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("Cannot parse '{raw}'"),
            })
        }
        _ => Ok(None),
    }
}
