//! Configuration management for the registry service
//!
//! Every flag falls back to an environment variable (a `.env` file is loaded
//! first), then to its default.

use clap::{Parser, ValueEnum};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// In-process map, lost on restart
    Memory,
    /// PostgreSQL `repositories` table
    Postgres,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is required when the storage backend is postgres")]
    MissingDatabaseUrl,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "repo-registry",
    about = "Registers GitHub repositories under one canonical identifier"
)]
pub struct Config {
    // HTTP server
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 8081)]
    pub port: u16,

    // Storage
    #[arg(long = "storage", env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Memory)]
    pub storage: StorageBackend,
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,
}

impl Config {
    /// Parse process arguments (exits on `--help` or bad flags) and validate.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage == StorageBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
