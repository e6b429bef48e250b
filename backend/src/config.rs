//! Configuration management for Warehouse Manager
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::ledger::MissingVehiclePolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Which store backs the repository, and whether to seed it
    pub storage: StorageConfig,

    /// Stock ledger behavior
    pub ledger: LedgerConfig,

    /// Listing page sizes
    pub paging: PagingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Populate the demonstration dataset when the store is first created
    pub seed_sample: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    pub missing_vehicle: MissingVehiclePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PagingConfig {
    pub items_per_page: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/warehouse_manager")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("storage.backend", "postgres")?
            .set_default("storage.seed_sample", false)?
            .set_default("ledger.missing_vehicle", "zero_tare")?
            .set_default("paging.items_per_page", shared::DEFAULT_ITEMS_PER_PAGE)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WM_ prefix)
            .add_source(
                Environment::with_prefix("WM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.paging.items_per_page < 1 {
            return Err(AppError::Configuration(format!(
                "paging.items_per_page must be at least 1, got {}",
                self.paging.items_per_page
            )));
        }
        if self.storage.backend == StorageBackend::Postgres {
            if self.database.url.trim().is_empty() {
                return Err(AppError::Configuration(
                    "database.url is required for the postgres backend".into(),
                ));
            }
            if self.database.min_connections > self.database.max_connections {
                return Err(AppError::Configuration(format!(
                    "database.min_connections ({}) exceeds max_connections ({})",
                    self.database.min_connections, self.database.max_connections
                )));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            items_per_page: shared::DEFAULT_ITEMS_PER_PAGE,
        }
    }
}
