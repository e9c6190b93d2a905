//! Configuration module for environment variables and application settings

use anyhow::Result;
use once_cell::sync::Lazy;
use std::env;

/// Global application configuration loaded from environment variables
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Reader endpoints and timeouts
    pub readers: ReaderConfig,

    /// Engine tunables
    pub engine: EngineConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Game indexer GraphQL endpoint (heroes, pets, pools, LP positions)
    pub indexer_url: String,
    /// Expedition/quest REST API base URL
    pub expedition_api_url: String,
    /// Token price API base URL
    pub price_api_url: String,
    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum pairs assigned per pool
    pub pairs_per_pool: usize,
    /// Synthetic LP share used for what-if projections
    pub reference_lp_share: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },

            readers: ReaderConfig {
                indexer_url: env::var("GARDEN_INDEXER_URL")
                    .unwrap_or_else(|_| "https://indexer.example-game.io/graphql".to_string()),
                expedition_api_url: env::var("GARDEN_EXPEDITION_API_URL")
                    .unwrap_or_else(|_| "https://expeditions.example-game.io/api".to_string()),
                price_api_url: env::var("GARDEN_PRICE_API_URL")
                    .unwrap_or_else(|_| "https://prices.example-game.io/api/prices".to_string()),
                http_timeout_secs: env::var("GARDEN_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },

            engine: EngineConfig {
                pairs_per_pool: env::var("GARDEN_PAIRS_PER_POOL")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .unwrap_or(1),
                reference_lp_share: env::var("GARDEN_REFERENCE_LP_SHARE")
                    .unwrap_or_else(|_| "0.0001".to_string())
                    .parse()
                    .unwrap_or(0.0001),
            },
        })
    }
}

impl EngineConfig {
    pub fn params(&self) -> crate::engine::types::EngineParams {
        crate::engine::types::EngineParams {
            pairs_per_pool: self.pairs_per_pool,
            reference_lp_share: self.reference_lp_share,
        }
    }
}
