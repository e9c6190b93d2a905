//! Expedition/quest readers: Tier-1/Tier-2 pairing evidence, reward-claim
//! history and per-hero fast-regeneration status.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::engine::types::{ActiveQuest, ExpeditionRecord, GardenError, RewardClaim, RewardToken};

pub struct QuestReader {
    client: Client,
    base_url: String,
}

impl QuestReader {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Tier-1 evidence: the expedition API's view of active multi-hero
    /// quests for a wallet.
    pub async fn expedition_pairs(
        &self,
        wallet: &str,
    ) -> Result<Vec<ExpeditionRecord>, GardenError> {
        let url = format!("{}/expeditions?wallet={}", self.base_url, wallet);
        let body = self.get_json(&url).await?;

        let records = body["expeditions"].as_array().cloned().unwrap_or_default();
        let pairs = records
            .iter()
            .filter_map(|r| {
                Some(ExpeditionRecord {
                    pool_id: r["poolId"].as_str()?.to_string(),
                    hero_ids: parse_hero_ids(&r["heroIds"]),
                })
            })
            .filter(|r| r.hero_ids.len() >= 2)
            .collect::<Vec<_>>();
        debug!(wallet, count = pairs.len(), "fetched expedition pairs");
        Ok(pairs)
    }

    /// Tier-2 evidence: active-quest records from chain state.
    pub async fn active_quests(&self, wallet: &str) -> Result<Vec<ActiveQuest>, GardenError> {
        let url = format!("{}/quests/active?wallet={}", self.base_url, wallet);
        let body = self.get_json(&url).await?;

        let records = body["quests"].as_array().cloned().unwrap_or_default();
        let quests = records
            .iter()
            .filter_map(|r| {
                Some(ActiveQuest {
                    pool_id: r["poolId"].as_str()?.to_string(),
                    hero_ids: parse_hero_ids(&r["heroIds"]),
                    attempts: r["attempts"].as_u64().map(|a| a as u32),
                    iteration_time_seconds: r["iterationTimeSeconds"].as_f64(),
                    started_at: r["startedAt"]
                        .as_str()
                        .and_then(|s| s.parse::<DateTime<Utc>>().ok()),
                })
            })
            .collect::<Vec<_>>();
        debug!(wallet, count = quests.len(), "fetched active quests");
        Ok(quests)
    }

    /// Verified reward-claim history used to pin pairing roles.
    pub async fn reward_claims(&self, wallet: &str) -> Result<Vec<RewardClaim>, GardenError> {
        let url = format!("{}/quests/claims?wallet={}", self.base_url, wallet);
        let body = self.get_json(&url).await?;

        let records = body["claims"].as_array().cloned().unwrap_or_default();
        let claims = records
            .iter()
            .filter_map(|r| {
                let token = match r["token"].as_str()? {
                    "crystal" => RewardToken::Crystal,
                    "jewel" => RewardToken::Jewel,
                    _ => return None,
                };
                Some(RewardClaim {
                    hero_id: r["heroId"].as_str()?.to_string(),
                    token,
                })
            })
            .collect();
        Ok(claims)
    }

    /// Hero ids with the fast-regeneration power-up active.
    pub async fn fast_regen_heroes(&self, wallet: &str) -> Result<HashSet<String>, GardenError> {
        let url = format!("{}/powerups/fast-regen?wallet={}", self.base_url, wallet);
        let body = self.get_json(&url).await?;

        let ids = body["heroIds"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn get_json(&self, url: &str) -> Result<Value, GardenError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GardenError::Upstream(format!(
                "expedition API HTTP {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response.json().await?)
    }
}

fn parse_hero_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| {
                    v.as_str()
                        .map(String::from)
                        .or_else(|| v.as_u64().map(|n| n.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hero_ids_accept_strings_and_numbers() {
        let ids = parse_hero_ids(&json!(["12", 34, "56"]));
        assert_eq!(ids, vec!["12", "34", "56"]);
        assert!(parse_hero_ids(&json!(null)).is_empty());
    }
}
