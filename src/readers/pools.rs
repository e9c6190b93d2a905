//! Pool metadata, reward-fund balances and wallet LP positions.

use serde_json::{Value, json};
use tracing::debug;

use crate::engine::types::{GardenError, LpPosition, Pool, RewardFund};
use crate::readers::GraphQlClient;

const POOLS_QUERY: &str = r#"
query GardenPools {
  pools(first: 100) {
    id
    pairName
    allocationShare
    totalStaked
    totalValueLocked
  }
}
"#;

const REWARD_FUND_QUERY: &str = r#"
query RewardFund {
  rewardFund {
    crystalBalance
    jewelBalance
  }
}
"#;

const LP_POSITIONS_QUERY: &str = r#"
query LpPositions($owner: String!) {
  lpPositions(where: { owner: $owner }) {
    poolId
    stakedRaw
  }
}
"#;

pub struct PoolReader {
    indexer: GraphQlClient,
}

impl PoolReader {
    pub fn new(indexer: GraphQlClient) -> Self {
        Self { indexer }
    }

    pub async fn pools(&self) -> Result<Vec<Pool>, GardenError> {
        let data = self.indexer.query(POOLS_QUERY, json!({})).await?;
        let records = data["pools"]
            .as_array()
            .ok_or_else(|| GardenError::Parse("pools field is not an array".into()))?;

        let pools: Vec<Pool> = records.iter().filter_map(parse_pool).collect();
        debug!(count = pools.len(), "fetched pools");
        Ok(pools)
    }

    /// Current emission-fund balances for both reward tokens.
    pub async fn reward_fund(&self) -> Result<RewardFund, GardenError> {
        let data = self.indexer.query(REWARD_FUND_QUERY, json!({})).await?;
        let fund = &data["rewardFund"];
        Ok(RewardFund {
            crystal: parse_number(&fund["crystalBalance"]),
            jewel: parse_number(&fund["jewelBalance"]),
        })
    }

    pub async fn lp_positions(&self, owner: &str) -> Result<Vec<LpPosition>, GardenError> {
        let data = self
            .indexer
            .query(LP_POSITIONS_QUERY, json!({ "owner": owner }))
            .await?;
        let records = data["lpPositions"]
            .as_array()
            .ok_or_else(|| GardenError::Parse("lpPositions field is not an array".into()))?;

        let positions = records
            .iter()
            .filter_map(|r| {
                Some(LpPosition {
                    pool_id: r["poolId"].as_str()?.to_string(),
                    staked_raw: parse_number(&r["stakedRaw"]),
                })
            })
            .collect();
        Ok(positions)
    }
}

fn parse_pool(record: &Value) -> Option<Pool> {
    Some(Pool {
        id: record["id"].as_str()?.to_string(),
        pair: record["pairName"].as_str().unwrap_or("").to_string(),
        allocation_share: parse_number(&record["allocationShare"]),
        total_staked_raw: parse_number(&record["totalStaked"]),
        total_value_locked: parse_number(&record["totalValueLocked"]),
    })
}

/// Indexer numerics arrive either as JSON numbers or big-number strings.
fn parse_number(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0.0)
}
