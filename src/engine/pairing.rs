//! Reconstructs which heroes are currently paired, and in which role, from
//! incomplete on-chain signals.
//!
//! Detection runs over an ordered chain of strategies behind a common
//! trait; the first tier returning at least one pair wins. Every emitted
//! pairing carries its source tag so consumers can display confidence.

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::types::{
    Diagnostic, Pairing, PairingSource, RewardToken, RoleSource, WalletSnapshot,
};

/// Stamina per run assumed when no tier supplied an observed value.
const DEFAULT_ATTEMPTS: u32 = 25;

/// A pair of co-located heroes before role resolution.
#[derive(Debug, Clone)]
pub struct DetectedPair {
    pub pool_id: String,
    pub hero_a: String,
    pub hero_b: String,
    pub attempts: Option<u32>,
    pub iteration_time_seconds: Option<f64>,
}

/// One tier of the detection chain.
pub trait PairingStrategy {
    fn source(&self) -> PairingSource;

    /// Return all pairs this tier can see, or empty to fall through.
    fn detect(&self, snapshot: &WalletSnapshot) -> Vec<DetectedPair>;
}

/// Tier 1: the expedition API reports active multi-hero quests directly.
pub struct ExpeditionApiTier;

impl PairingStrategy for ExpeditionApiTier {
    fn source(&self) -> PairingSource {
        PairingSource::ExpeditionApi
    }

    fn detect(&self, snapshot: &WalletSnapshot) -> Vec<DetectedPair> {
        snapshot
            .expedition_pairs
            .iter()
            .flat_map(|record| {
                record.hero_ids.chunks_exact(2).map(|pair| DetectedPair {
                    pool_id: record.pool_id.clone(),
                    hero_a: pair[0].clone(),
                    hero_b: pair[1].clone(),
                    attempts: None,
                    iteration_time_seconds: None,
                })
            })
            .collect()
    }
}

/// Tier 2: active-quest records from chain state, which carry observed
/// attempts and sometimes a measured cycle time.
pub struct ActiveQuestTier;

impl PairingStrategy for ActiveQuestTier {
    fn source(&self) -> PairingSource {
        PairingSource::ActiveQuests
    }

    fn detect(&self, snapshot: &WalletSnapshot) -> Vec<DetectedPair> {
        snapshot
            .active_quests
            .iter()
            .flat_map(|quest| {
                quest.hero_ids.chunks_exact(2).map(|pair| DetectedPair {
                    pool_id: quest.pool_id.clone(),
                    hero_a: pair[0].clone(),
                    hero_b: pair[1].clone(),
                    attempts: quest.attempts,
                    iteration_time_seconds: quest.iteration_time_seconds,
                })
            })
            .collect()
    }
}

/// Tier 3, explicitly a fallback: group heroes sharing the same
/// `current_quest` pool id and pair them positionally in encounter order.
pub struct CurrentQuestTier;

impl PairingStrategy for CurrentQuestTier {
    fn source(&self) -> PairingSource {
        PairingSource::CurrentQuest
    }

    fn detect(&self, snapshot: &WalletSnapshot) -> Vec<DetectedPair> {
        // BTreeMap keeps pool groups in a stable order across runs.
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for hero in &snapshot.heroes {
            if let Some(pool_id) = &hero.current_quest {
                groups.entry(pool_id.as_str()).or_default().push(&hero.id);
            }
        }

        let mut pairs = Vec::new();
        for (pool_id, heroes) in groups {
            for pair in heroes.chunks_exact(2) {
                pairs.push(DetectedPair {
                    pool_id: pool_id.to_string(),
                    hero_a: pair[0].to_string(),
                    hero_b: pair[1].to_string(),
                    attempts: None,
                    iteration_time_seconds: None,
                });
            }
        }
        pairs
    }
}

/// The detection chain, highest-confidence tier first.
pub struct PairingDetector {
    tiers: Vec<Box<dyn PairingStrategy>>,
}

impl Default for PairingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingDetector {
    pub fn new() -> Self {
        Self {
            tiers: vec![
                Box::new(ExpeditionApiTier),
                Box::new(ActiveQuestTier),
                Box::new(CurrentQuestTier),
            ],
        }
    }

    /// Run the tiers in order and resolve roles on the first non-empty
    /// result. Pairs referencing heroes missing from the snapshot are
    /// skipped with a diagnostic, not fatal.
    pub fn detect(
        &self,
        snapshot: &WalletSnapshot,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Pairing> {
        for tier in &self.tiers {
            let detected = tier.detect(snapshot);
            if detected.is_empty() {
                continue;
            }
            debug!(source = ?tier.source(), pairs = detected.len(), "pairing tier matched");
            return self.resolve(detected, tier.source(), snapshot, diagnostics);
        }
        Vec::new()
    }

    fn resolve(
        &self,
        detected: Vec<DetectedPair>,
        source: PairingSource,
        snapshot: &WalletSnapshot,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Pairing> {
        let mut pairings = Vec::new();

        for pair in detected {
            let mut missing = false;
            for hero_id in [&pair.hero_a, &pair.hero_b] {
                if !snapshot.heroes.iter().any(|h| &h.id == hero_id) {
                    diagnostics.push(Diagnostic::MissingReference {
                        entity: "hero".into(),
                        id: hero_id.clone(),
                        context: format!("pairing in pool {}", pair.pool_id),
                    });
                    missing = true;
                }
            }
            if missing {
                continue;
            }

            let (primary, secondary, role_source) = assign_roles(&pair, snapshot);
            pairings.push(Pairing {
                primary_hero: primary,
                secondary_hero: secondary,
                pool_id: pair.pool_id,
                attempts: pair.attempts.unwrap_or(DEFAULT_ATTEMPTS),
                iteration_time_seconds: pair.iteration_time_seconds,
                source,
                role_source,
            });
        }
        pairings
    }
}

/// Which paired hero earns the primary reward token.
///
/// Verified reward-claim history wins when present for either member;
/// otherwise the first-seen hero takes the primary role.
fn assign_roles(pair: &DetectedPair, snapshot: &WalletSnapshot) -> (String, String, RoleSource) {
    for claim in &snapshot.reward_claims {
        if claim.hero_id == pair.hero_a {
            return match claim.token {
                RewardToken::Crystal => {
                    (pair.hero_a.clone(), pair.hero_b.clone(), RoleSource::RewardHistory)
                }
                RewardToken::Jewel => {
                    (pair.hero_b.clone(), pair.hero_a.clone(), RoleSource::RewardHistory)
                }
            };
        }
        if claim.hero_id == pair.hero_b {
            return match claim.token {
                RewardToken::Crystal => {
                    (pair.hero_b.clone(), pair.hero_a.clone(), RoleSource::RewardHistory)
                }
                RewardToken::Jewel => {
                    (pair.hero_a.clone(), pair.hero_b.clone(), RoleSource::RewardHistory)
                }
            };
        }
    }
    (pair.hero_a.clone(), pair.hero_b.clone(), RoleSource::FirstSeen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{
        ActiveQuest, ExpeditionRecord, Hero, RewardClaim, RewardFund, TokenPrices, WalletSnapshot,
    };
    use chrono::Utc;

    fn hero(id: &str, current_quest: Option<&str>) -> Hero {
        Hero {
            id: id.into(),
            level: 10,
            wisdom: 40,
            vitality: 40,
            gardening: 50.0,
            has_gardening_gene: false,
            has_fast_regen: false,
            current_quest: current_quest.map(String::from),
            equipped_pet: None,
        }
    }

    fn snapshot(heroes: Vec<Hero>) -> WalletSnapshot {
        WalletSnapshot {
            wallet: "0xwallet".into(),
            taken_at: Utc::now(),
            heroes,
            pets: vec![],
            pools: vec![],
            reward_fund: RewardFund::default(),
            lp_positions: vec![],
            expedition_pairs: vec![],
            active_quests: vec![],
            reward_claims: vec![],
            prices: TokenPrices::default(),
        }
    }

    #[test]
    fn tier_one_wins_when_present() {
        let mut snap = snapshot(vec![hero("a", None), hero("b", None)]);
        snap.expedition_pairs = vec![ExpeditionRecord {
            pool_id: "garden-0".into(),
            hero_ids: vec!["a".into(), "b".into()],
        }];
        snap.active_quests = vec![ActiveQuest {
            pool_id: "garden-1".into(),
            hero_ids: vec!["a".into(), "b".into()],
            attempts: Some(20),
            iteration_time_seconds: None,
            started_at: None,
        }];

        let mut diags = Vec::new();
        let pairings = PairingDetector::new().detect(&snap, &mut diags);
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].source, PairingSource::ExpeditionApi);
        assert_eq!(pairings[0].pool_id, "garden-0");
    }

    #[test]
    fn tier_two_is_used_before_falling_to_tier_three() {
        let mut snap = snapshot(vec![
            hero("a", Some("garden-9")),
            hero("b", Some("garden-9")),
        ]);
        snap.active_quests = vec![ActiveQuest {
            pool_id: "garden-1".into(),
            hero_ids: vec!["a".into(), "b".into()],
            attempts: Some(20),
            iteration_time_seconds: Some(18_000.0),
            started_at: None,
        }];

        let mut diags = Vec::new();
        let pairings = PairingDetector::new().detect(&snap, &mut diags);
        assert_eq!(pairings.len(), 1);
        // Must never silently fall through to the current-quest heuristic
        // when the active-quest tier had data.
        assert_eq!(pairings[0].source, PairingSource::ActiveQuests);
        assert_eq!(pairings[0].attempts, 20);
        assert_eq!(pairings[0].iteration_time_seconds, Some(18_000.0));
    }

    #[test]
    fn tier_three_groups_by_current_quest_in_encounter_order() {
        let snap = snapshot(vec![
            hero("a", Some("garden-2")),
            hero("b", Some("garden-2")),
            hero("c", Some("garden-2")),
            hero("d", None),
        ]);
        let mut diags = Vec::new();
        let pairings = PairingDetector::new().detect(&snap, &mut diags);
        // Three co-located heroes make one positional pair; the odd one out
        // is left unpaired.
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].source, PairingSource::CurrentQuest);
        assert_eq!(pairings[0].primary_hero, "a");
        assert_eq!(pairings[0].secondary_hero, "b");
    }

    #[test]
    fn reward_history_pins_roles() {
        let mut snap = snapshot(vec![hero("a", None), hero("b", None)]);
        snap.expedition_pairs = vec![ExpeditionRecord {
            pool_id: "garden-0".into(),
            hero_ids: vec!["a".into(), "b".into()],
        }];
        snap.reward_claims = vec![RewardClaim {
            hero_id: "b".into(),
            token: RewardToken::Crystal,
        }];

        let mut diags = Vec::new();
        let pairings = PairingDetector::new().detect(&snap, &mut diags);
        assert_eq!(pairings[0].primary_hero, "b");
        assert_eq!(pairings[0].secondary_hero, "a");
        assert_eq!(pairings[0].role_source, RoleSource::RewardHistory);
    }

    #[test]
    fn missing_hero_reference_is_skipped_with_diagnostic() {
        let mut snap = snapshot(vec![hero("a", None)]);
        snap.expedition_pairs = vec![ExpeditionRecord {
            pool_id: "garden-0".into(),
            hero_ids: vec!["a".into(), "ghost".into()],
        }];

        let mut diags = Vec::new();
        let pairings = PairingDetector::new().detect(&snap, &mut diags);
        assert!(pairings.is_empty());
        assert!(diags
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingReference { id, .. } if id == "ghost")));
    }
}
