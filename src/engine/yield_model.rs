//! Per-hero yield factor, pet bonus resolution and the stamina model.
//!
//! Everything in this module is a pure function of its arguments. The
//! magic numbers mirror the live game's stat curves and are not tunable.

use crate::engine::types::{GatheringBonus, Hero, Pet};

/// Baseline stamina regeneration: 1 point per 20 minutes.
pub const BASE_REGEN_SECONDS: f64 = 1200.0;
/// Regeneration floor with the fast-regen power-up active.
pub const MIN_REGEN_SECONDS: f64 = 300.0;

/// Gardening-gene multiplier applied to the effective yield factor by
/// scoring call sites. Independent of the divisor's gene term.
pub const GENE_FACTOR_MULTIPLIER: f64 = 1.2;

/// A hero's gardening factor.
///
/// `additional_skill` is extra skill in formula units (raw / 10), e.g.
/// from a SkilledGreenskeeper pet. The gene multiplier is *not* applied
/// here; callers fold it in where the effective factor is needed.
pub fn hero_factor(hero: &Hero, additional_skill: f64) -> f64 {
    0.1 + (hero.wisdom + hero.vitality) as f64 / 1222.22
        + (hero.gardening / 10.0 + additional_skill) / 244.44
}

/// The two ways a pet bonus can enter the yield formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetEffect {
    /// Extra gardening skill in formula units, applied before `hero_factor`.
    pub additional_skill: f64,
    /// Multiplier applied once to the final per-run yield.
    pub multiplier: f64,
}

impl PetEffect {
    pub const NONE: PetEffect = PetEffect {
        additional_skill: 0.0,
        multiplier: 1.0,
    };
}

/// Resolve a pet's bonus into its formula effect.
///
/// An unfed pet contributes nothing. A pet applies exactly one of the two
/// effects; the additive and multiplicative paths are never compounded.
pub fn pet_effect(pet: &Pet) -> PetEffect {
    if !pet.is_fed {
        return PetEffect::NONE;
    }
    match pet.bonus_kind {
        GatheringBonus::PowerSurge => PetEffect {
            additional_skill: 0.0,
            multiplier: 1.0 + pet.bonus_scalar / 100.0,
        },
        GatheringBonus::SkilledGreenskeeper => PetEffect {
            additional_skill: pet.bonus_scalar / 10.0,
            multiplier: 1.0,
        },
        GatheringBonus::Other => PetEffect {
            additional_skill: 0.0,
            multiplier: 1.0 + pet.bonus_scalar / 100.0,
        },
        GatheringBonus::None => PetEffect::NONE,
    }
}

/// Pick the single pet maximizing `hero_factor x pet_multiplier` for this
/// hero. Pets are scarce; the caller is responsible for not handing the
/// same pet to two heroes.
pub fn best_pet_for<'a>(hero: &Hero, pets: &'a [Pet]) -> Option<(&'a Pet, PetEffect)> {
    let baseline = hero_factor(hero, 0.0);
    let mut best: Option<(&Pet, PetEffect, f64)> = None;
    for pet in pets {
        let effect = pet_effect(pet);
        let score = hero_factor(hero, effect.additional_skill) * effect.multiplier;
        if score <= baseline {
            continue;
        }
        let better = match &best {
            Some((_, _, s)) => score > *s,
            None => true,
        };
        if better {
            best = Some((pet, effect, score));
        }
    }
    best.map(|(pet, effect, _)| (pet, effect))
}

/// Seconds to regenerate one stamina point.
pub fn regen_seconds(level: u32, has_fast_regen: bool) -> f64 {
    if has_fast_regen {
        (BASE_REGEN_SECONDS - level as f64 * 3.0).max(MIN_REGEN_SECONDS)
    } else {
        BASE_REGEN_SECONDS
    }
}

/// Stamina points recovered per day.
pub fn stamina_per_day(level: u32, has_fast_regen: bool) -> f64 {
    86_400.0 / regen_seconds(level, has_fast_regen)
}

/// Quest duration per stamina point: the gardening gene shortens it.
pub fn quest_minutes_per_stamina(has_gardening_gene: bool) -> f64 {
    if has_gardening_gene { 10.0 } else { 12.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{GatheringBonus, Hero, Pet};

    fn hero(wisdom: u32, vitality: u32, gardening: f64, gene: bool) -> Hero {
        Hero {
            id: "1".into(),
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

    fn pet(kind: GatheringBonus, scalar: f64, fed: bool) -> Pet {
        Pet {
            id: "p".into(),
            bonus_kind: kind,
            bonus_scalar: scalar,
            is_fed: fed,
            equipped_to: None,
        }
    }

    #[test]
    fn factor_matches_hand_computation() {
        // wisdom=50, vitality=50, raw skill=0 -> 0.1 + 100/1222.22
        let h = hero(50, 50, 0.0, false);
        let expected = 0.1 + 100.0 / 1222.22;
        assert!((hero_factor(&h, 0.0) - expected).abs() < 1e-12);
        assert!((hero_factor(&h, 0.0) - 0.1818).abs() < 1e-3);
    }

    #[test]
    fn additional_skill_is_additive_before_formula() {
        let h = hero(10, 10, 50.0, false);
        let base = hero_factor(&h, 0.0);
        let boosted = hero_factor(&h, 2.0);
        assert!((boosted - base - 2.0 / 244.44).abs() < 1e-12);
    }

    #[test]
    fn greenskeeper_adds_skill_surge_multiplies() {
        let gk = pet_effect(&pet(GatheringBonus::SkilledGreenskeeper, 30.0, true));
        assert_eq!(gk.additional_skill, 3.0);
        assert_eq!(gk.multiplier, 1.0);

        let ps = pet_effect(&pet(GatheringBonus::PowerSurge, 30.0, true));
        assert_eq!(ps.additional_skill, 0.0);
        assert!((ps.multiplier - 1.3).abs() < 1e-12);
    }

    #[test]
    fn unfed_pet_contributes_nothing() {
        let e = pet_effect(&pet(GatheringBonus::PowerSurge, 50.0, false));
        assert_eq!(e, PetEffect::NONE);
    }

    #[test]
    fn best_pet_maximizes_factor_times_multiplier() {
        let h = hero(50, 50, 100.0, true);
        let pets = vec![
            pet(GatheringBonus::SkilledGreenskeeper, 10.0, true),
            pet(GatheringBonus::PowerSurge, 15.0, true),
            pet(GatheringBonus::PowerSurge, 80.0, false),
        ];
        // +1 formula-unit of skill moves the factor by 1/244.44 (~1.4%),
        // while the fed surge pet multiplies by 1.15.
        let (best, effect) = best_pet_for(&h, &pets).unwrap();
        assert_eq!(best.bonus_kind, GatheringBonus::PowerSurge);
        assert!((effect.multiplier - 1.15).abs() < 1e-12);
    }

    #[test]
    fn stamina_regen_model() {
        assert_eq!(stamina_per_day(1, false), 72.0);
        // Fast regen: max(300, 1200 - 3*level)
        assert_eq!(regen_seconds(100, true), 900.0);
        assert_eq!(regen_seconds(400, true), 300.0);
        assert!((stamina_per_day(100, true) - 96.0).abs() < 1e-12);
    }

    #[test]
    fn gene_shortens_quest_time() {
        assert_eq!(quest_minutes_per_stamina(true), 10.0);
        assert_eq!(quest_minutes_per_stamina(false), 12.0);
    }
}
