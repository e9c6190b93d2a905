//! The Yield Optimization & Pairing Engine.
//!
//! Synchronous and stateless: one invocation consumes an assembled
//! [`WalletSnapshot`] and returns an [`EngineReport`]. All I/O lives in
//! the reader layer; every call is independent and re-entrant.

pub mod allocator;
pub mod attempt_search;
pub mod pairing;
pub mod pool_scorer;
pub mod types;
pub mod yield_model;

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use crate::engine::pairing::PairingDetector;
use crate::engine::types::{EngineParams, EngineReport, StaminaRecommendation, WalletSnapshot};

/// Run one full engine pass: portfolio allocation, per-hero stamina
/// recommendations, and pairing detection.
pub fn run(snapshot: &WalletSnapshot, params: &EngineParams) -> EngineReport {
    debug!(
        wallet = %snapshot.wallet,
        heroes = snapshot.heroes.len(),
        pets = snapshot.pets.len(),
        pools = snapshot.pools.len(),
        "running yield engine"
    );

    let outcome = allocator::allocate(snapshot, params);
    let mut diagnostics = outcome.diagnostics;

    let pairings = PairingDetector::new().detect(snapshot, &mut diagnostics);
    let recommendations = recommend_stamina(snapshot);

    EngineReport {
        wallet: snapshot.wallet.clone(),
        generated_at: Utc::now(),
        allocations: outcome.allocations,
        recommendations,
        pairings,
        diagnostics,
    }
}

/// Optimal-stamina recommendation per hero, with the best available pet
/// resolved per hero in snapshot order. Pets are scarce: once handed to a
/// hero they are not recommended to another.
fn recommend_stamina(snapshot: &WalletSnapshot) -> Vec<StaminaRecommendation> {
    let mut used_pets: HashSet<String> = HashSet::new();
    let mut recommendations = Vec::with_capacity(snapshot.heroes.len());

    for hero in &snapshot.heroes {
        let available: Vec<_> = snapshot
            .pets
            .iter()
            .filter(|p| !used_pets.contains(&p.id))
            .cloned()
            .collect();
        let best = yield_model::best_pet_for(hero, &available);

        let pet_id = match &best {
            Some((pet, _)) => {
                used_pets.insert(pet.id.clone());
                Some(pet.id.clone())
            }
            None => None,
        };

        // The pool-specific yield scale does not move the optimum, so unit
        // yields suffice here.
        let search = attempt_search::optimal_attempts(
            yield_model::quest_minutes_per_stamina(hero.has_gardening_gene),
            yield_model::stamina_per_day(hero.level, hero.has_fast_regen),
            1.0,
            0.0,
        );

        recommendations.push(StaminaRecommendation {
            hero_id: hero.id.clone(),
            pet_id,
            attempts: search.attempts,
            runs_per_day: search.runs_per_day,
            iteration_minutes: search.iteration_minutes,
            gating: search.gating,
        });
    }
    recommendations
}
