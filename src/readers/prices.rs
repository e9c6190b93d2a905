//! Token USD prices with a small in-process cache.

use dashmap::DashMap;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::types::{GardenError, TokenPrices};

pub struct PriceReader {
    client: Client,
    base_url: String,
    cache: DashMap<String, f64>,
}

impl PriceReader {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            cache: DashMap::new(),
        }
    }

    /// Fetch both reward-token prices, falling back to the last cached
    /// value per token when the feed omits one.
    pub async fn reward_token_prices(&self) -> Result<TokenPrices, GardenError> {
        let url = format!("{}?ids=crystal,jewel", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GardenError::Upstream(format!(
                "price API HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        if let Some(data) = body.get("data").and_then(|d| d.as_object()) {
            for (token, entry) in data {
                if let Some(price) = entry.get("price").and_then(|p| p.as_f64()) {
                    self.cache.insert(token.clone(), price);
                }
            }
        }

        let prices = TokenPrices {
            crystal_usd: self.cached("crystal"),
            jewel_usd: self.cached("jewel"),
        };
        if prices.crystal_usd == 0.0 || prices.jewel_usd == 0.0 {
            warn!(?prices, "price feed incomplete, USD projections degraded");
        } else {
            debug!(?prices, "fetched reward token prices");
        }
        Ok(prices)
    }

    fn cached(&self, token: &str) -> f64 {
        self.cache.get(token).map(|e| *e.value()).unwrap_or(0.0)
    }
}
