use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub connectors: ConnectorConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Food-cost percentage a branch is expected to stay under
    pub target_food_cost_pct: Decimal,
    /// How many days back to scan for a usable closing-stock valuation
    pub max_lookback_days: u32,
}

/// Base URLs and HTTP tuning for the external data sources.
/// Per-restaurant credentials live on the connected accounts, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    pub rista_base_url: String,
    pub gmail_base_url: String,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                target_food_cost_pct: env::var("TARGET_FOOD_COST_PCT")
                    .unwrap_or_else(|_| "25".to_string())
                    .parse::<Decimal>()
                    .map_err(|_| {
                        AppError::Configuration("Invalid TARGET_FOOD_COST_PCT".to_string())
                    })?,
                max_lookback_days: env::var("MAX_LOOKBACK_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid MAX_LOOKBACK_DAYS".to_string()))?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            connectors: ConnectorConfig {
                rista_base_url: env::var("RISTA_BASE_URL")
                    .unwrap_or_else(|_| "https://api.ristaapps.com/v1".to_string()),
                gmail_base_url: env::var("GMAIL_BASE_URL")
                    .unwrap_or_else(|_| "https://gmail.googleapis.com".to_string()),
                http_timeout_secs: env::var("CONNECTOR_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid CONNECTOR_TIMEOUT_SECS".to_string())
                    })?,
                max_retries: env::var("CONNECTOR_MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid CONNECTOR_MAX_RETRIES".to_string())
                    })?,
            },
            security: SecurityConfig {
                allowed_origin: env::var("ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.target_food_cost_pct <= Decimal::ZERO
            || self.app.target_food_cost_pct >= Decimal::from(100)
        {
            return Err(AppError::Configuration(
                "Target food cost percentage must be between 0 and 100".to_string(),
            ));
        }

        if self.app.max_lookback_days == 0 {
            return Err(AppError::Configuration(
                "Max lookback days must be greater than 0".to_string(),
            ));
        }

        if self.connectors.max_retries > 10 {
            return Err(AppError::Configuration(
                "Connector retry count is unreasonably high".to_string(),
            ));
        }

        Ok(())
    }
}

impl AppConfig {
    /// Target food cost as a ratio (0.25 for 25%)
    pub fn target_food_cost_ratio(&self) -> Decimal {
        self.target_food_cost_pct / Decimal::from(100)
    }
}
