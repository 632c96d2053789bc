use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://motorcycles.db?mode=rwc";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 1,
        }
    }

    /// Private SQLite database that lives as long as its single connection.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    pub fn sqlite_file(path: impl AsRef<Path>) -> Self {
        Self::new(format!("sqlite://{}?mode=rwc", path.as_ref().display()))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

/// Shop details printed at the top of invoices and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dealer {
    pub name: String,
    pub tagline: String,
    pub phone: String,
    pub address: String,
    pub currency: String,
}

impl Default for Dealer {
    fn default() -> Self {
        Self {
            name: "Motorcycle Dealer".to_string(),
            tagline: "Motorcycle sales".to_string(),
            phone: String::new(),
            address: String::new(),
            currency: "FCFA".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub dealer: Dealer,
    pub log_level: String,
    pub report_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            dealer: Dealer::default(),
            log_level: "info".to_string(),
            report_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(fallback)
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value,
                })?,
            None => defaults.database.max_connections,
        };

        Ok(Self {
            database: DatabaseConfig {
                url: text("DATABASE_URL", defaults.database.url),
                max_connections,
            },
            dealer: Dealer {
                name: text("DEALER_NAME", defaults.dealer.name),
                tagline: text("DEALER_TAGLINE", defaults.dealer.tagline),
                phone: text("DEALER_PHONE", defaults.dealer.phone),
                address: text("DEALER_ADDRESS", defaults.dealer.address),
                currency: text("CURRENCY", defaults.dealer.currency),
            },
            log_level: text("LOG_LEVEL", defaults.log_level),
            report_dir: PathBuf::from(text(
                "REPORT_DIR",
                defaults.report_dir.display().to_string(),
            )),
        })
    }
}
