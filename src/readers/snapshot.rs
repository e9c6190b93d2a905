//! Fan-out/fan-in snapshot assembly.
//!
//! All reads are issued concurrently and joined before the engine is
//! invoked once on the result. Required reads (heroes, pools, reward fund)
//! fail the request; optional reads degrade the snapshot with a warning,
//! matching the engine's tolerance for partially-populated input.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::CONFIG;
use crate::engine::types::{GardenError, WalletSnapshot};
use crate::readers::heroes::HeroReader;
use crate::readers::pets::PetReader;
use crate::readers::pools::PoolReader;
use crate::readers::prices::PriceReader;
use crate::readers::quests::QuestReader;
use crate::readers::{GraphQlClient, http_client};

pub struct SnapshotAssembler {
    heroes: HeroReader,
    pets: PetReader,
    pools: PoolReader,
    quests: QuestReader,
    prices: PriceReader,
}

impl SnapshotAssembler {
    /// Build the assembler from the global configuration.
    pub fn from_config() -> Result<Self, GardenError> {
        let client = http_client(CONFIG.readers.http_timeout_secs)?;
        let indexer = GraphQlClient::new(client.clone(), CONFIG.readers.indexer_url.clone());

        Ok(Self {
            heroes: HeroReader::new(indexer.clone()),
            pets: PetReader::new(indexer.clone()),
            pools: PoolReader::new(indexer),
            quests: QuestReader::new(client.clone(), CONFIG.readers.expedition_api_url.clone()),
            prices: PriceReader::new(client, CONFIG.readers.price_api_url.clone()),
        })
    }

    /// Issue all reads concurrently and join them into one snapshot.
    pub async fn assemble(&self, wallet: &str) -> Result<WalletSnapshot, GardenError> {
        let (
            heroes,
            pets,
            pools,
            reward_fund,
            lp_positions,
            expedition_pairs,
            active_quests,
            reward_claims,
            fast_regen,
            prices,
        ) = futures::join!(
            self.heroes.heroes_by_owner(wallet),
            self.pets.pets_by_owner(wallet),
            self.pools.pools(),
            self.pools.reward_fund(),
            self.pools.lp_positions(wallet),
            self.quests.expedition_pairs(wallet),
            self.quests.active_quests(wallet),
            self.quests.reward_claims(wallet),
            self.quests.fast_regen_heroes(wallet),
            self.prices.reward_token_prices(),
        );

        // Without heroes, pools or the fund there is nothing to optimize.
        let mut heroes = heroes?;
        let pools = pools?;
        let reward_fund = reward_fund?;

        let pets = optional(pets, "pets");
        let lp_positions = optional(lp_positions, "lp_positions");
        let expedition_pairs = optional(expedition_pairs, "expedition_pairs");
        let active_quests = optional(active_quests, "active_quests");
        let reward_claims = optional(reward_claims, "reward_claims");
        let prices = optional(prices, "prices");

        match fast_regen {
            Ok(ids) => {
                for hero in &mut heroes {
                    hero.has_fast_regen = ids.contains(&hero.id);
                }
            }
            Err(e) => warn!(error = %e, "fast-regen read failed, assuming baseline regen"),
        }

        info!(
            wallet,
            heroes = heroes.len(),
            pets = pets.len(),
            pools = pools.len(),
            "assembled wallet snapshot"
        );

        Ok(WalletSnapshot {
            wallet: wallet.to_string(),
            taken_at: Utc::now(),
            heroes,
            pets,
            pools,
            reward_fund,
            lp_positions,
            expedition_pairs,
            active_quests,
            reward_claims,
            prices,
        })
    }
}

/// An optional read degrades to its default instead of failing the request.
fn optional<T: Default>(result: Result<T, GardenError>, section: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(section, error = %e, "optional read failed, degrading snapshot");
            T::default()
        }
    }
}
