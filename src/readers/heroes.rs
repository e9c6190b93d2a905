//! Heroes-by-owner reader against the game indexer.

use serde_json::{Value, json};
use tracing::debug;

use crate::engine::types::{GardenError, Hero};
use crate::readers::GraphQlClient;

const HEROES_QUERY: &str = r#"
query HeroesByOwner($owner: String!) {
  heroes(where: { owner: $owner }, first: 1000) {
    id
    level
    wisdom
    vitality
    gardening
    professionGene
    currentQuest
    equippedPetId
  }
}
"#;

pub struct HeroReader {
    indexer: GraphQlClient,
}

impl HeroReader {
    pub fn new(indexer: GraphQlClient) -> Self {
        Self { indexer }
    }

    /// Fetch all heroes owned by the wallet, dropping records that cannot
    /// be parsed rather than failing the whole read.
    pub async fn heroes_by_owner(&self, owner: &str) -> Result<Vec<Hero>, GardenError> {
        let data = self
            .indexer
            .query(HEROES_QUERY, json!({ "owner": owner }))
            .await?;

        let records = data["heroes"]
            .as_array()
            .ok_or_else(|| GardenError::Parse("heroes field is not an array".into()))?;

        let heroes: Vec<Hero> = records.iter().filter_map(parse_hero).collect();
        debug!(owner, count = heroes.len(), "fetched heroes");
        Ok(heroes)
    }
}

fn parse_hero(record: &Value) -> Option<Hero> {
    Some(Hero {
        id: record["id"].as_str()?.to_string(),
        level: record["level"].as_u64().unwrap_or(1) as u32,
        wisdom: record["wisdom"].as_u64().unwrap_or(0) as u32,
        vitality: record["vitality"].as_u64().unwrap_or(0) as u32,
        gardening: record["gardening"].as_f64().unwrap_or(0.0),
        has_gardening_gene: record["professionGene"].as_str() == Some("gardening"),
        // Fast-regen status comes from the power-up reader and is folded in
        // during snapshot assembly.
        has_fast_regen: false,
        current_quest: record["currentQuest"]
            .as_str()
            .filter(|q| !q.is_empty() && *q != "0x0000000000000000000000000000000000000000")
            .map(String::from),
        equipped_pet: record["equippedPetId"].as_str().map(String::from),
    })
}
