//! Pets-by-owner reader against the game indexer.

use serde_json::{Value, json};
use tracing::debug;

use crate::engine::types::{GardenError, GatheringBonus, Pet};
use crate::readers::GraphQlClient;

const PETS_QUERY: &str = r#"
query PetsByOwner($owner: String!) {
  pets(where: { owner: $owner }, first: 1000) {
    id
    gatheringBonusType
    gatheringBonusScalar
    fedState
    equippedTo
  }
}
"#;

pub struct PetReader {
    indexer: GraphQlClient,
}

impl PetReader {
    pub fn new(indexer: GraphQlClient) -> Self {
        Self { indexer }
    }

    pub async fn pets_by_owner(&self, owner: &str) -> Result<Vec<Pet>, GardenError> {
        let data = self
            .indexer
            .query(PETS_QUERY, json!({ "owner": owner }))
            .await?;

        let records = data["pets"]
            .as_array()
            .ok_or_else(|| GardenError::Parse("pets field is not an array".into()))?;

        let pets: Vec<Pet> = records.iter().filter_map(parse_pet).collect();
        debug!(owner, count = pets.len(), "fetched pets");
        Ok(pets)
    }
}

fn parse_pet(record: &Value) -> Option<Pet> {
    let bonus_kind = match record["gatheringBonusType"].as_str() {
        Some("power_surge") => GatheringBonus::PowerSurge,
        Some("skilled_greenskeeper") => GatheringBonus::SkilledGreenskeeper,
        Some("") | None => GatheringBonus::None,
        Some(_) => GatheringBonus::Other,
    };
    Some(Pet {
        id: record["id"].as_str()?.to_string(),
        bonus_kind,
        bonus_scalar: record["gatheringBonusScalar"].as_f64().unwrap_or(0.0),
        is_fed: record["fedState"].as_str() == Some("fed"),
        equipped_to: record["equippedTo"].as_str().map(String::from),
    })
}
