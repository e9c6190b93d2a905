//! Per-run reward scoring against a pool and the emission funds.
//!
//! The 300/50/72/144 constants encode the live game's emission schedule.
//! They are fixed here on purpose and must never become configuration.

use crate::engine::types::RewardFund;

/// Reward divisor for a hero.
///
/// `divisor = (300 - 50 x gene) x mod_base`, where `mod_base` drops from
/// 144 to 72 once the gardening skill reaches 10 formula units (raw 100).
pub fn reward_divisor(has_gardening_gene: bool, gardening_raw: f64) -> f64 {
    let gene_bonus = if has_gardening_gene { 1.0 } else { 0.0 };
    let mod_base = if gardening_raw / 10.0 >= 10.0 { 72.0 } else { 144.0 };
    (300.0 - 50.0 * gene_bonus) * mod_base
}

/// Yield of one reward token for a single run.
///
/// Linear in `attempts`; the same formula is applied to each token against
/// its own fund balance.
#[allow(clippy::too_many_arguments)]
pub fn per_run_yield(
    fund_balance: f64,
    allocation_share: f64,
    lp_share: f64,
    hero_factor: f64,
    pet_multiplier: f64,
    attempts: u32,
    divisor: f64,
) -> f64 {
    fund_balance * allocation_share * lp_share * hero_factor * pet_multiplier * attempts as f64
        / divisor
}

/// Per-run yield of both reward tokens for one hero/pet combination.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunYield {
    pub crystal: f64,
    pub jewel: f64,
}

pub fn run_yield(
    fund: &RewardFund,
    allocation_share: f64,
    lp_share: f64,
    hero_factor: f64,
    pet_multiplier: f64,
    attempts: u32,
    divisor: f64,
) -> RunYield {
    RunYield {
        crystal: per_run_yield(
            fund.crystal,
            allocation_share,
            lp_share,
            hero_factor,
            pet_multiplier,
            attempts,
            divisor,
        ),
        jewel: per_run_yield(
            fund.jewel,
            allocation_share,
            lp_share,
            hero_factor,
            pet_multiplier,
            attempts,
            divisor,
        ),
    }
}
