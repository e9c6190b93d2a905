//! Plain data records consumed and produced by the yield engine.
//!
//! Everything here is a snapshot value: constructed fresh from the reader
//! layer at the start of an engine invocation and discarded at the end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate-wide error type shared by the engine and the reader layer.
#[derive(Debug, Error)]
pub enum GardenError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upstream API error: {0}")]
    Upstream(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

/// A hero snapshot as read from the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub level: u32,
    pub wisdom: u32,
    pub vitality: u32,
    /// Raw gardening skill, 0–100. Formula units are this value / 10.
    pub gardening: f64,
    pub has_gardening_gene: bool,
    /// Fast-regeneration power-up active for this hero.
    #[serde(default)]
    pub has_fast_regen: bool,
    /// Pool id the hero is currently questing at, if any.
    #[serde(default)]
    pub current_quest: Option<String>,
    #[serde(default)]
    pub equipped_pet: Option<String>,
}

/// Gathering bonus archetype carried by a pet.
///
/// PowerSurge and SkilledGreenskeeper are mutually exclusive effects:
/// multiplicative-on-yield versus additive-on-skill. Never compound both
/// for the same pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatheringBonus {
    PowerSurge,
    SkilledGreenskeeper,
    Other,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub bonus_kind: GatheringBonus,
    /// Bonus magnitude as a percentage (e.g. 10.0 = +10%).
    pub bonus_scalar: f64,
    pub is_fed: bool,
    #[serde(default)]
    pub equipped_to: Option<String>,
}

/// Liquidity-farming pool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    /// Token pair label, e.g. "CRYSTAL-AVAX".
    pub pair: String,
    /// Fraction of total reward emission allocated to this pool, 0–1.
    pub allocation_share: f64,
    pub total_staked_raw: f64,
    pub total_value_locked: f64,
}

/// Current emission-fund balances for the two reward tokens.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RewardFund {
    /// Primary reward token balance (CRYSTAL-side).
    pub crystal: f64,
    /// Secondary reward token balance (JEWEL-side).
    pub jewel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardToken {
    Crystal,
    Jewel,
}

/// A wallet's staked amount in one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpPosition {
    pub pool_id: String,
    pub staked_raw: f64,
}

/// USD prices supplied by the price reader.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenPrices {
    pub crystal_usd: f64,
    pub jewel_usd: f64,
}

/// Tier-1 pairing evidence: the expedition API reports active multi-hero
/// quests directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpeditionRecord {
    pub pool_id: String,
    pub hero_ids: Vec<String>,
}

/// Tier-2 pairing evidence: an active-quest record from chain state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub pool_id: String,
    pub hero_ids: Vec<String>,
    /// Stamina spent per run, when the record carries it.
    #[serde(default)]
    pub attempts: Option<u32>,
    /// Measured wall-clock cycle time, when the record carries it.
    #[serde(default)]
    pub iteration_time_seconds: Option<f64>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// A verified reward claim from quest history, used to pin down which
/// paired hero earns which reward token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardClaim {
    pub hero_id: String,
    pub token: RewardToken,
}

/// The assembled in-memory snapshot the engine runs on. The engine never
/// fetches anything itself; partially-populated snapshots are tolerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub wallet: String,
    pub taken_at: DateTime<Utc>,
    pub heroes: Vec<Hero>,
    pub pets: Vec<Pet>,
    pub pools: Vec<Pool>,
    pub reward_fund: RewardFund,
    #[serde(default)]
    pub lp_positions: Vec<LpPosition>,
    #[serde(default)]
    pub expedition_pairs: Vec<ExpeditionRecord>,
    #[serde(default)]
    pub active_quests: Vec<ActiveQuest>,
    #[serde(default)]
    pub reward_claims: Vec<RewardClaim>,
    #[serde(default)]
    pub prices: TokenPrices,
}

/// Tunables for one engine invocation. The emission-schedule constants are
/// not here on purpose; they are fixed in the scorer.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    /// Maximum pairs assigned per pool (cap is `pairs_per_pool * 2` heroes).
    pub pairs_per_pool: usize,
    /// Synthetic LP share used for pools where the wallet holds no position.
    pub reference_lp_share: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            pairs_per_pool: 1,
            reference_lp_share: 0.0001,
        }
    }
}

/// Provenance of a detected pairing, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingSource {
    #[serde(rename = "expedition_api")]
    ExpeditionApi,
    #[serde(rename = "active_quests")]
    ActiveQuests,
    #[serde(rename = "currentQuest")]
    CurrentQuest,
}

/// How the primary/secondary role split inside a pairing was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// Verified against reward-claim history.
    RewardHistory,
    /// First-seen hero assumed primary.
    FirstSeen,
}

/// Two heroes currently questing together, with the primary-reward earner
/// resolved and the evidence tier that produced the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    /// Hero earning the primary (CRYSTAL-side) reward.
    pub primary_hero: String,
    /// Hero earning the secondary (JEWEL-side) reward.
    pub secondary_hero: String,
    pub pool_id: String,
    /// Stamina spent per run.
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_time_seconds: Option<f64>,
    pub source: PairingSource,
    pub role_source: RoleSource,
}

/// Whether a farming cycle is bounded by stamina recovery or quest
/// execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleGating {
    RegenGated,
    QuestGated,
}

/// A (hero, pet-or-none) combination with its derived yield inputs.
#[derive(Debug, Clone, Serialize)]
pub struct PairCandidate {
    pub hero_id: String,
    pub pet_id: Option<String>,
    /// Hero factor including any additive (SkilledGreenskeeper) pet skill.
    pub hero_factor: f64,
    /// Multiplicative pet bonus (PowerSurge / Other), 1.0 when none.
    pub pet_multiplier: f64,
    pub has_gardening_gene: bool,
    /// Best stamina-per-run found by the attempt search.
    pub attempts: u32,
    pub runs_per_day: f64,
    pub iteration_minutes: f64,
    pub gating: CycleGating,
    /// Reward divisor per the emission schedule.
    pub divisor: f64,
    /// effective factor x runs per day; the greedy sort key.
    pub adjusted_score: f64,
}

/// Optimal-stamina recommendation for one hero (or hero/pet combination).
#[derive(Debug, Clone, Serialize)]
pub struct StaminaRecommendation {
    pub hero_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<String>,
    pub attempts: u32,
    pub runs_per_day: f64,
    pub iteration_minutes: f64,
    pub gating: CycleGating,
}

/// One assigned pair inside a pool allocation, with projected yield.
#[derive(Debug, Clone, Serialize)]
pub struct PairAssignment {
    pub hero_a: String,
    pub hero_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_b: Option<String>,
    pub attempts: u32,
    pub runs_per_day: f64,
    pub crystal_per_day: f64,
    pub jewel_per_day: f64,
    pub usd_per_day: f64,
}

/// Per-pool slice of the portfolio, ranked best first.
#[derive(Debug, Clone, Serialize)]
pub struct PoolAllocation {
    pub pool_id: String,
    pub pair: String,
    pub lp_share: f64,
    /// True when the wallet holds no LP position and the reference share
    /// was used for a what-if projection.
    pub what_if: bool,
    pub pairs: Vec<PairAssignment>,
    pub crystal_per_day: f64,
    pub jewel_per_day: f64,
    pub usd_per_day: f64,
}

/// Non-fatal conditions absorbed during an engine run. These degrade
/// output coverage instead of aborting.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A pairing or allocation step referenced an id absent from the snapshot.
    MissingReference {
        entity: String,
        id: String,
        context: String,
    },
    /// Zero TVL or zero total staked; pool excluded before scoring.
    DegeneratePool { pool_id: String },
    /// Fewer than 2 unclaimed heroes remained for a pool slot.
    InsufficientInventory { pool_id: String, unclaimed: usize },
}

/// Full engine output for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub wallet: String,
    pub generated_at: DateTime<Utc>,
    pub allocations: Vec<PoolAllocation>,
    pub recommendations: Vec<StaminaRecommendation>,
    pub pairings: Vec<Pairing>,
    pub diagnostics: Vec<Diagnostic>,
}
