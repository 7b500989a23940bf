//! Determinism helpers for army composition.
//!
//! Composition draws training levels from an RNG. Given the same seed, the
//! same budget and the same census it must produce the same army.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use porcupine_core::raid::{ArmyBudget, ArmyComposer, ArmyComposition, RacePopulation};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Hash any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash of a composition, division by division.
#[must_use]
pub fn composition_hash(composition: &ArmyComposition) -> u64 {
    let mut hasher = DefaultHasher::new();
    composition.total_soldiers.hash(&mut hasher);
    composition.divisions.hash(&mut hasher);
    hasher.finish()
}

/// Compose `runs` times with the same seed and check every result hashes
/// the same. Returns `false` when composition fails.
#[must_use]
pub fn verify_composition_determinism(
    composer: &ArmyComposer,
    budget: &ArmyBudget,
    census: &[RacePopulation],
    seed: u64,
    runs: usize,
) -> bool {
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        let mut rng = StdRng::seed_from_u64(seed);
        match composer.compose(budget, census, &mut rng) {
            Ok(composition) => hashes.push(composition_hash(&composition)),
            Err(err) => {
                tracing::error!("composition failed: {}", err);
                return false;
            }
        }
    }
    hashes.windows(2).all(|pair| pair[0] == pair[1])
}

/// Proptest strategies for composer inputs.
pub mod strategies {
    use proptest::prelude::*;

    use porcupine_core::raid::{
        ArmyBudget, ComposerConfig, RaceId, RacePopulation, TrainingRange,
    };

    /// A valid composer config.
    pub fn arb_composer_config() -> impl Strategy<Value = ComposerConfig> {
        (1u64..200)
            .prop_flat_map(|per_division| (Just(per_division), 0..=per_division))
            .prop_flat_map(|(per_division, min_army)| {
                (
                    Just(per_division),
                    Just(min_army),
                    arb_training_range(),
                    arb_training_range(),
                )
            })
            .prop_map(
                |(pawns_per_division, min_army_size, melee_training, ranged_training)| {
                    ComposerConfig {
                        pawns_per_division,
                        min_army_size,
                        melee_training,
                        ranged_training,
                    }
                },
            )
    }

    /// A non-empty training range.
    pub fn arb_training_range() -> impl Strategy<Value = TrainingRange> {
        (0u32..10)
            .prop_flat_map(|lower| (Just(lower), (lower + 1)..12))
            .prop_map(|(lower, upper)| TrainingRange::new(lower, upper))
    }

    /// Unit cost in silver, never zero.
    pub fn arb_cost() -> impl Strategy<Value = u64> {
        1u64..5_000
    }

    /// Budget with positive costs.
    pub fn arb_army_budget() -> impl Strategy<Value = ArmyBudget> {
        (
            0u64..2_000_000,
            0u64..1_000_000,
            0u64..1_000_000,
            arb_cost(),
            arb_cost(),
            arb_cost(),
            arb_cost(),
        )
            .prop_map(
                |(pawns, weapons, armour, cost_per_pawn, cost_melee, cost_ranged, cost_armour)| {
                    ArmyBudget {
                        pawns,
                        weapons,
                        armour,
                        cost_per_pawn,
                        cost_melee,
                        cost_ranged,
                        cost_armour,
                    }
                },
            )
    }

    /// Non-empty census of up to eight races.
    pub fn arb_census() -> impl Strategy<Value = Vec<RacePopulation>> {
        proptest::collection::vec(0u64..10_000, 1..8).prop_map(|populations| {
            populations
                .into_iter()
                .enumerate()
                .map(|(index, population)| RacePopulation {
                    race: RaceId(index as u32),
                    population,
                })
                .collect()
        })
    }
}
