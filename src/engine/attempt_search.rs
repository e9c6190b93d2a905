//! Optimal stamina-per-run search.
//!
//! A 26-point exhaustive scan over attempts in [10, 35]. Deterministic and
//! side-effect free; ties resolve to the smallest attempts value.

use serde::Serialize;

use crate::engine::types::CycleGating;

pub const MIN_ATTEMPTS: u32 = 10;
pub const MAX_ATTEMPTS: u32 = 35;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Result of the attempts scan for one hero or hero pair.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchOutcome {
    pub attempts: u32,
    pub runs_per_day: f64,
    pub iteration_minutes: f64,
    pub gating: CycleGating,
    pub crystal_per_day: f64,
    pub jewel_per_day: f64,
}

/// Cycle length for a given run size: the cycle is bounded by whichever is
/// slower, quest execution or stamina recovery.
pub fn iteration_minutes(
    attempts: u32,
    quest_minutes_per_stamina: f64,
    stamina_per_day: f64,
) -> (f64, CycleGating) {
    let quest_gated = attempts as f64 * quest_minutes_per_stamina;
    let regen_gated = attempts as f64 / stamina_per_day * MINUTES_PER_DAY;
    if regen_gated >= quest_gated {
        (regen_gated, CycleGating::RegenGated)
    } else {
        (quest_gated, CycleGating::QuestGated)
    }
}

/// Scan attempts in [10, 35] and return the run size maximizing daily
/// yield.
///
/// Per-run yields scale linearly with attempts, so the caller passes the
/// per-attempt yield of each reward token. Passing unit yields (1.0, 0.0)
/// gives a pool-independent optimum, since the linear scale factor does
/// not move the argmax.
pub fn optimal_attempts(
    quest_minutes_per_stamina: f64,
    stamina_per_day: f64,
    crystal_per_attempt: f64,
    jewel_per_attempt: f64,
) -> SearchOutcome {
    let mut best: Option<SearchOutcome> = None;

    for attempts in MIN_ATTEMPTS..=MAX_ATTEMPTS {
        let (minutes, gating) =
            iteration_minutes(attempts, quest_minutes_per_stamina, stamina_per_day);
        let runs_per_day = MINUTES_PER_DAY / minutes;
        let crystal_per_day = crystal_per_attempt * attempts as f64 * runs_per_day;
        let jewel_per_day = jewel_per_attempt * attempts as f64 * runs_per_day;
        let daily_yield = crystal_per_day + jewel_per_day;

        let candidate = SearchOutcome {
            attempts,
            runs_per_day,
            iteration_minutes: minutes,
            gating,
            crystal_per_day,
            jewel_per_day,
        };

        let improves = match &best {
            Some(b) => daily_yield > b.crystal_per_day + b.jewel_per_day,
            None => true,
        };
        if improves {
            best = Some(candidate);
        }
    }

    // The range is non-empty, so best is always set.
    best.expect("attempts range is non-empty")
}
