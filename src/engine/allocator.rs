//! Greedy multi-pool portfolio allocation.
//!
//! Candidates are (hero, pet-or-none) combinations ranked by
//! `effective_factor x runs_per_day`; pools are ranked each round by the
//! yield their single best unclaimed candidate could produce in that
//! specific pool. Claims are tracked in an explicit [`ClaimedSet`] value
//! threaded through the reduction, so the pass is a pure function of the
//! snapshot.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::engine::attempt_search::optimal_attempts;
use crate::engine::pool_scorer::{reward_divisor, run_yield};
use crate::engine::types::{
    Diagnostic, EngineParams, Hero, PairAssignment, PairCandidate, Pet, Pool, PoolAllocation,
    WalletSnapshot,
};
use crate::engine::yield_model::{
    GENE_FACTOR_MULTIPLIER, PetEffect, hero_factor, pet_effect, quest_minutes_per_stamina,
    stamina_per_day,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Hero and pet ids consumed so far in one allocation pass.
///
/// Set-based exclusivity: a hero or pet appears in at most one assignment.
#[derive(Debug, Default, Clone)]
pub struct ClaimedSet {
    heroes: HashSet<String>,
    pets: HashSet<String>,
}

impl ClaimedSet {
    pub fn blocks(&self, candidate: &PairCandidate) -> bool {
        if self.heroes.contains(&candidate.hero_id) {
            return true;
        }
        match &candidate.pet_id {
            Some(pet) => self.pets.contains(pet),
            None => false,
        }
    }

    pub fn claim(&mut self, candidate: &PairCandidate) {
        self.heroes.insert(candidate.hero_id.clone());
        if let Some(pet) = &candidate.pet_id {
            self.pets.insert(pet.clone());
        }
    }

    pub fn release(&mut self, candidate: &PairCandidate) {
        self.heroes.remove(&candidate.hero_id);
        if let Some(pet) = &candidate.pet_id {
            self.pets.remove(pet);
        }
    }

    pub fn unclaimed_heroes(&self, heroes: &[Hero]) -> usize {
        heroes
            .iter()
            .filter(|h| !self.heroes.contains(&h.id))
            .count()
    }
}

/// Result of one allocation pass.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocations: Vec<PoolAllocation>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build one no-pet candidate per hero plus one candidate per viable
/// hero/pet combination, each with its attempt-search optimum attached.
///
/// Sorted descending by adjusted score with a stable tie-break on hero id
/// (then pet id), so repeated passes over the same snapshot are identical.
pub fn build_candidates(heroes: &[Hero], pets: &[Pet]) -> Vec<PairCandidate> {
    let mut candidates = Vec::new();

    for hero in heroes {
        candidates.push(make_candidate(hero, None, PetEffect::NONE));

        for pet in pets {
            let effect = pet_effect(pet);
            // Unfed or bonus-less pets add nothing over the no-pet candidate.
            if effect == PetEffect::NONE {
                continue;
            }
            candidates.push(make_candidate(hero, Some(pet.id.clone()), effect));
        }
    }

    candidates.sort_by(|a, b| {
        b.adjusted_score
            .partial_cmp(&a.adjusted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.hero_id.cmp(&b.hero_id))
            .then_with(|| a.pet_id.cmp(&b.pet_id))
    });
    candidates
}

fn make_candidate(hero: &Hero, pet_id: Option<String>, effect: PetEffect) -> PairCandidate {
    let factor = hero_factor(hero, effect.additional_skill);
    let gene_multiplier = if hero.has_gardening_gene {
        GENE_FACTOR_MULTIPLIER
    } else {
        1.0
    };
    let effective_factor = factor * effect.multiplier * gene_multiplier;

    let search = optimal_attempts(
        quest_minutes_per_stamina(hero.has_gardening_gene),
        stamina_per_day(hero.level, hero.has_fast_regen),
        1.0,
        0.0,
    );

    PairCandidate {
        hero_id: hero.id.clone(),
        pet_id,
        hero_factor: factor,
        pet_multiplier: effect.multiplier,
        has_gardening_gene: hero.has_gardening_gene,
        attempts: search.attempts,
        runs_per_day: search.runs_per_day,
        iteration_minutes: search.iteration_minutes,
        gating: search.gating,
        divisor: reward_divisor(hero.has_gardening_gene, hero.gardening),
        // Rewards fast-cycling heroes proportionally: a hero that runs 3x
        // as often is worth 3x a marginally higher factor.
        adjusted_score: effective_factor * search.runs_per_day,
    }
}

/// A pool that survived the degeneracy filter, with its resolved LP share.
#[derive(Debug, Clone)]
struct EligiblePool {
    pool: Pool,
    lp_share: f64,
    what_if: bool,
}

/// Run the greedy allocation over the snapshot.
pub fn allocate(snapshot: &WalletSnapshot, params: &EngineParams) -> AllocationOutcome {
    let mut diagnostics = Vec::new();

    let known_pools: HashSet<&str> = snapshot.pools.iter().map(|p| p.id.as_str()).collect();
    let known_pets: HashSet<&str> = snapshot.pets.iter().map(|p| p.id.as_str()).collect();

    // LP positions referencing pools outside the snapshot are skipped with
    // a diagnostic, not fatal.
    let mut staked_by_pool: HashMap<&str, f64> = HashMap::new();
    for position in &snapshot.lp_positions {
        if !known_pools.contains(position.pool_id.as_str()) {
            diagnostics.push(Diagnostic::MissingReference {
                entity: "pool".into(),
                id: position.pool_id.clone(),
                context: "lp_position".into(),
            });
            continue;
        }
        *staked_by_pool.entry(position.pool_id.as_str()).or_default() += position.staked_raw;
    }

    for hero in &snapshot.heroes {
        if let Some(pet_id) = &hero.equipped_pet {
            if !known_pets.contains(pet_id.as_str()) {
                diagnostics.push(Diagnostic::MissingReference {
                    entity: "pet".into(),
                    id: pet_id.clone(),
                    context: format!("equipped to hero {}", hero.id),
                });
            }
        }
    }

    let mut remaining: Vec<EligiblePool> = Vec::new();
    for pool in &snapshot.pools {
        if pool.total_value_locked <= 0.0 || pool.total_staked_raw <= 0.0 {
            debug!(pool = %pool.id, "excluding degenerate pool");
            diagnostics.push(Diagnostic::DegeneratePool {
                pool_id: pool.id.clone(),
            });
            continue;
        }
        let (lp_share, what_if) = match staked_by_pool.get(pool.id.as_str()) {
            Some(staked) => (staked / pool.total_staked_raw, false),
            None => (params.reference_lp_share, true),
        };
        remaining.push(EligiblePool {
            pool: pool.clone(),
            lp_share,
            what_if,
        });
    }

    let candidates = build_candidates(&snapshot.heroes, &snapshot.pets);
    let mut claimed = ClaimedSet::default();
    let mut allocations = Vec::new();

    while !remaining.is_empty() {
        if claimed.unclaimed_heroes(&snapshot.heroes) < 2 {
            for entry in &remaining {
                debug!(pool = %entry.pool.id, "skipping pool, not enough unclaimed heroes");
                diagnostics.push(Diagnostic::InsufficientInventory {
                    pool_id: entry.pool.id.clone(),
                    unclaimed: claimed.unclaimed_heroes(&snapshot.heroes),
                });
            }
            break;
        }

        // Rank pools by the yield of their single best unclaimed candidate
        // in that specific pool, not by a global hero score. This keeps a
        // high-allocation pool from being starved of its ideal hero.
        let next = remaining
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, best_candidate_yield(entry, &candidates, &claimed, snapshot)))
            .max_by(|(ia, a), (ib, b)| {
                a.partial_cmp(b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        remaining[*ib]
                            .pool
                            .id
                            .cmp(&remaining[*ia].pool.id)
                    })
            });
        let Some((index, _)) = next else { break };
        let entry = remaining.remove(index);

        match allocate_pool(&entry, &candidates, &mut claimed, snapshot, params) {
            Ok(allocation) => allocations.push(allocation),
            Err(unclaimed) => {
                diagnostics.push(Diagnostic::InsufficientInventory {
                    pool_id: entry.pool.id.clone(),
                    unclaimed,
                });
            }
        }
    }

    AllocationOutcome {
        allocations,
        diagnostics,
    }
}

/// Daily yield the best unclaimed candidate could produce in this pool.
fn best_candidate_yield(
    entry: &EligiblePool,
    candidates: &[PairCandidate],
    claimed: &ClaimedSet,
    snapshot: &WalletSnapshot,
) -> f64 {
    candidates
        .iter()
        .filter(|c| !claimed.blocks(c))
        .map(|c| {
            let per_run = run_yield(
                &snapshot.reward_fund,
                entry.pool.allocation_share,
                entry.lp_share,
                c.hero_factor,
                c.pet_multiplier,
                c.attempts,
                c.divisor,
            );
            (per_run.crystal + per_run.jewel) * c.runs_per_day
        })
        .fold(0.0, f64::max)
}

/// Fill one pool: greedily select unclaimed candidates up to the per-pool
/// hero cap, pair them two-at-a-time in selection order, and project
/// yields. Returns the unclaimed-hero count on insufficient inventory so
/// the caller can record the skip.
fn allocate_pool(
    entry: &EligiblePool,
    candidates: &[PairCandidate],
    claimed: &mut ClaimedSet,
    snapshot: &WalletSnapshot,
    params: &EngineParams,
) -> Result<PoolAllocation, usize> {
    let hero_cap = params.pairs_per_pool * 2;
    let mut selected: Vec<&PairCandidate> = Vec::new();

    for candidate in candidates {
        if selected.len() >= hero_cap {
            break;
        }
        if claimed.blocks(candidate) {
            continue;
        }
        claimed.claim(candidate);
        selected.push(candidate);
    }

    if selected.len() < 2 {
        let short = selected.len();
        for candidate in selected {
            claimed.release(candidate);
        }
        return Err(short);
    }

    // A pair needs both seats; an odd straggler goes back to the pool of
    // unclaimed heroes.
    if selected.len() % 2 == 1 {
        let dropped = selected.pop().expect("selected is non-empty");
        claimed.release(dropped);
    }

    let mut pairs = Vec::new();
    let mut crystal_total = 0.0;
    let mut jewel_total = 0.0;

    for window in selected.chunks_exact(2) {
        let (a, b) = (window[0], window[1]);
        pairs.push(project_pair(a, b, entry, snapshot));
    }

    for pair in &pairs {
        crystal_total += pair.crystal_per_day;
        jewel_total += pair.jewel_per_day;
    }

    Ok(PoolAllocation {
        pool_id: entry.pool.id.clone(),
        pair: entry.pool.pair.clone(),
        lp_share: entry.lp_share,
        what_if: entry.what_if,
        pairs,
        crystal_per_day: crystal_total,
        jewel_per_day: jewel_total,
        usd_per_day: crystal_total * snapshot.prices.crystal_usd
            + jewel_total * snapshot.prices.jewel_usd,
    })
}

/// Project a pair's daily yield in a pool.
///
/// The pair cannot run faster than its slower member, unless a live
/// measured iteration time for these heroes in this pool overrides the
/// modeled cycle.
fn project_pair(
    a: &PairCandidate,
    b: &PairCandidate,
    entry: &EligiblePool,
    snapshot: &WalletSnapshot,
) -> PairAssignment {
    let (slower, runs_modeled) = if a.runs_per_day <= b.runs_per_day {
        (a, a.runs_per_day)
    } else {
        (b, b.runs_per_day)
    };
    let mut attempts = slower.attempts;
    let mut runs_per_day = runs_modeled;

    if let Some(quest) = snapshot.active_quests.iter().find(|q| {
        q.pool_id == entry.pool.id
            && q.hero_ids.iter().any(|h| *h == a.hero_id)
            && q.hero_ids.iter().any(|h| *h == b.hero_id)
    }) {
        if let Some(measured) = quest.iteration_time_seconds {
            if measured > 0.0 {
                runs_per_day = SECONDS_PER_DAY / measured;
            }
        }
        if let Some(observed) = quest.attempts {
            attempts = observed;
        }
    }

    let ya = run_yield(
        &snapshot.reward_fund,
        entry.pool.allocation_share,
        entry.lp_share,
        a.hero_factor,
        a.pet_multiplier,
        attempts,
        a.divisor,
    );
    let yb = run_yield(
        &snapshot.reward_fund,
        entry.pool.allocation_share,
        entry.lp_share,
        b.hero_factor,
        b.pet_multiplier,
        attempts,
        b.divisor,
    );

    let crystal_per_day = (ya.crystal + yb.crystal) * runs_per_day;
    let jewel_per_day = (ya.jewel + yb.jewel) * runs_per_day;

    PairAssignment {
        hero_a: a.hero_id.clone(),
        hero_b: b.hero_id.clone(),
        pet_a: a.pet_id.clone(),
        pet_b: b.pet_id.clone(),
        attempts,
        runs_per_day,
        crystal_per_day,
        jewel_per_day,
        usd_per_day: crystal_per_day * snapshot.prices.crystal_usd
            + jewel_per_day * snapshot.prices.jewel_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{
        GatheringBonus, LpPosition, Pet, Pool, RewardFund, TokenPrices, WalletSnapshot,
    };
    use chrono::Utc;

    fn hero(id: &str, wisdom: u32, vitality: u32, gardening: f64, gene: bool) -> Hero {
        Hero {
            id: id.into(),
            level: 10,
            wisdom,
            vitality,
            gardening,
            has_gardening_gene: gene,
            has_fast_regen: false,
            current_quest: None,
            equipped_pet: None,
        }
    }

    fn pool(id: &str, allocation_share: f64) -> Pool {
        Pool {
            id: id.into(),
            pair: "CRYSTAL-USDC".into(),
            allocation_share,
            total_staked_raw: 1_000_000.0,
            total_value_locked: 2_000_000.0,
        }
    }

    fn snapshot(heroes: Vec<Hero>, pets: Vec<Pet>, pools: Vec<Pool>) -> WalletSnapshot {
        WalletSnapshot {
            wallet: "0xwallet".into(),
            taken_at: Utc::now(),
            heroes,
            pets,
            pools,
            reward_fund: RewardFund {
                crystal: 1_000_000.0,
                jewel: 400_000.0,
            },
            lp_positions: vec![LpPosition {
                pool_id: "garden-0".into(),
                staked_raw: 10_000.0,
            }],
            expedition_pairs: vec![],
            active_quests: vec![],
            reward_claims: vec![],
            prices: TokenPrices {
                crystal_usd: 2.0,
                jewel_usd: 0.5,
            },
        }
    }

    #[test]
    fn no_pet_candidate_exists_per_hero() {
        let heroes = vec![hero("a", 40, 40, 50.0, false)];
        let pets = vec![Pet {
            id: "p1".into(),
            bonus_kind: GatheringBonus::PowerSurge,
            bonus_scalar: 20.0,
            is_fed: true,
            equipped_to: None,
        }];
        let candidates = build_candidates(&heroes, &pets);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().any(|c| c.pet_id.is_none()));
        // The fed surge pet strictly dominates, so it sorts first.
        assert_eq!(candidates[0].pet_id.as_deref(), Some("p1"));
    }

    #[test]
    fn unfed_pets_produce_no_combination() {
        let heroes = vec![hero("a", 40, 40, 50.0, false)];
        let pets = vec![Pet {
            id: "p1".into(),
            bonus_kind: GatheringBonus::PowerSurge,
            bonus_scalar: 20.0,
            is_fed: false,
            equipped_to: None,
        }];
        let candidates = build_candidates(&heroes, &pets);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].pet_id.is_none());
    }

    #[test]
    fn degenerate_pool_is_excluded_with_diagnostic() {
        let mut dead = pool("garden-1", 0.3);
        dead.total_value_locked = 0.0;
        let snap = snapshot(
            vec![hero("a", 40, 40, 50.0, false), hero("b", 40, 40, 50.0, false)],
            vec![],
            vec![pool("garden-0", 0.2), dead],
        );
        let outcome = allocate(&snap, &EngineParams::default());
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.allocations[0].pool_id, "garden-0");
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::DegeneratePool { pool_id } if pool_id == "garden-1")));
    }

    #[test]
    fn single_hero_cannot_fill_a_pool() {
        let snap = snapshot(
            vec![hero("a", 40, 40, 50.0, false)],
            vec![],
            vec![pool("garden-0", 0.2)],
        );
        let outcome = allocate(&snap, &EngineParams::default());
        assert!(outcome.allocations.is_empty());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::InsufficientInventory { .. })));
    }

    #[test]
    fn heroes_and_pets_are_never_double_assigned() {
        let heroes: Vec<Hero> = (0..6)
            .map(|i| hero(&format!("h{i}"), 30 + i, 30, 40.0 + i as f64, i % 2 == 0))
            .collect();
        let pets = vec![
            Pet {
                id: "p1".into(),
                bonus_kind: GatheringBonus::PowerSurge,
                bonus_scalar: 15.0,
                is_fed: true,
                equipped_to: None,
            },
            Pet {
                id: "p2".into(),
                bonus_kind: GatheringBonus::SkilledGreenskeeper,
                bonus_scalar: 20.0,
                is_fed: true,
                equipped_to: None,
            },
        ];
        let snap = snapshot(
            heroes,
            pets,
            vec![pool("garden-0", 0.2), pool("garden-1", 0.1), pool("garden-2", 0.05)],
        );
        let params = EngineParams {
            pairs_per_pool: 1,
            ..Default::default()
        };
        let outcome = allocate(&snap, &params);

        let mut seen_heroes = HashSet::new();
        let mut seen_pets = HashSet::new();
        for allocation in &outcome.allocations {
            for pair in &allocation.pairs {
                assert!(seen_heroes.insert(pair.hero_a.clone()));
                assert!(seen_heroes.insert(pair.hero_b.clone()));
                if let Some(p) = &pair.pet_a {
                    assert!(seen_pets.insert(p.clone()));
                }
                if let Some(p) = &pair.pet_b {
                    assert!(seen_pets.insert(p.clone()));
                }
            }
        }
    }

    #[test]
    fn per_pool_hero_cap_is_respected() {
        let heroes: Vec<Hero> = (0..8)
            .map(|i| hero(&format!("h{i}"), 40, 40, 50.0, false))
            .collect();
        let snap = snapshot(heroes, vec![], vec![pool("garden-0", 0.2)]);
        let params = EngineParams {
            pairs_per_pool: 2,
            ..Default::default()
        };
        let outcome = allocate(&snap, &params);
        assert_eq!(outcome.allocations[0].pairs.len(), 2);
    }

    #[test]
    fn measured_iteration_time_overrides_modeled_runs() {
        let mut snap = snapshot(
            vec![hero("a", 40, 40, 50.0, false), hero("b", 40, 40, 50.0, false)],
            vec![],
            vec![pool("garden-0", 0.2)],
        );
        snap.active_quests = vec![crate::engine::types::ActiveQuest {
            pool_id: "garden-0".into(),
            hero_ids: vec!["a".into(), "b".into()],
            attempts: Some(25),
            iteration_time_seconds: Some(21_600.0),
            started_at: None,
        }];
        let outcome = allocate(&snap, &EngineParams::default());
        let pair = &outcome.allocations[0].pairs[0];
        assert_eq!(pair.attempts, 25);
        assert!((pair.runs_per_day - 4.0).abs() < 1e-9);
    }

    #[test]
    fn allocation_is_idempotent() {
        let heroes: Vec<Hero> = (0..6)
            .map(|i| hero(&format!("h{i}"), 30 + i, 35, 45.0, i % 2 == 0))
            .collect();
        let snap = snapshot(
            heroes,
            vec![],
            vec![pool("garden-0", 0.2), pool("garden-1", 0.1)],
        );
        let params = EngineParams::default();
        let first = allocate(&snap, &params);
        let second = allocate(&snap, &params);
        assert_eq!(
            serde_json::to_value(&first.allocations).unwrap(),
            serde_json::to_value(&second.allocations).unwrap()
        );
    }
}
