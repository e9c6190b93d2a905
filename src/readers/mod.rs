//! External collaborators: async readers that fetch the raw records the
//! engine consumes. The engine itself never performs I/O; everything here
//! runs before an invocation and is joined into one [`WalletSnapshot`].
//!
//! [`WalletSnapshot`]: crate::engine::types::WalletSnapshot

pub mod heroes;
pub mod pets;
pub mod pools;
pub mod prices;
pub mod quests;
pub mod snapshot;

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::engine::types::GardenError;

/// Shared HTTP client factory with the request timeout applied.
pub fn http_client(timeout_secs: u64) -> Result<Client, GardenError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(GardenError::Http)
}

/// Thin GraphQL client for the game indexer.
#[derive(Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// POST a query and return the `data` object, surfacing GraphQL-level
    /// errors as upstream failures.
    pub async fn query(&self, query: &str, variables: Value) -> Result<Value, GardenError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GardenError::Upstream(format!(
                "indexer HTTP {} for {}",
                response.status(),
                self.endpoint
            )));
        }

        let body: Value = response.json().await?;
        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                return Err(GardenError::Upstream(format!(
                    "indexer returned {} GraphQL errors: {}",
                    errors.len(),
                    errors[0]
                )));
            }
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| GardenError::Parse("indexer response missing data field".into()))
    }
}
