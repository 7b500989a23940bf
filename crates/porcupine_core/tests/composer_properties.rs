//! Property tests for the army composer.

use porcupine_core::raid::composer::{equipment_pips, EQUIPMENT_PIPS_MAX};
use porcupine_core::raid::{ArmyBudgetDivision, ArmyComposer, RaceId, UnitCosts};
use porcupine_test_utils::determinism::strategies::{
    arb_army_budget, arb_census, arb_composer_config,
};
use porcupine_test_utils::determinism::verify_composition_determinism;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    /// Fielded soldiers equal the budgeted count, or the floor for small armies.
    #[test]
    fn prop_soldiers_are_conserved(
        config in arb_composer_config(),
        budget in arb_army_budget(),
    ) {
        let composer = ArmyComposer::new(config.clone()).unwrap();
        let total = budget.soldier_count().unwrap();
        let allocations = composer.plan_allocations(&budget).unwrap();
        let fielded: u64 = allocations.iter().map(|a| a.soldiers).sum();

        if total < config.min_army_size {
            prop_assert_eq!(allocations.len(), 1);
            prop_assert_eq!(fielded, config.min_army_size);
        } else {
            prop_assert_eq!(fielded, total);
            prop_assert_eq!(allocations.len() as u64, composer.division_count(total));
        }
    }

    /// No division exceeds the configured size.
    #[test]
    fn prop_divisions_never_overflow(
        config in arb_composer_config(),
        budget in arb_army_budget(),
    ) {
        let composer = ArmyComposer::new(config.clone()).unwrap();
        for allocation in composer.plan_allocations(&budget).unwrap() {
            prop_assert!(allocation.soldiers <= config.pawns_per_division);
        }
    }

    /// Every purchased item is handed to exactly one division.
    #[test]
    fn prop_equipment_is_fully_distributed(
        config in arb_composer_config(),
        budget in arb_army_budget(),
    ) {
        let composer = ArmyComposer::new(config).unwrap();
        let allocations = composer.plan_allocations(&budget).unwrap();

        let melee: u64 = allocations.iter().map(|a| a.melee).sum();
        let ranged: u64 = allocations.iter().map(|a| a.ranged).sum();
        let armour: u64 = allocations.iter().map(|a| a.armour).sum();

        if !allocations.is_empty() {
            prop_assert_eq!(melee, budget.weapons / budget.cost_melee);
            prop_assert_eq!(ranged, budget.weapons / budget.cost_ranged);
            prop_assert_eq!(armour, budget.armour / budget.cost_armour);
        }
    }

    /// Composed divisions stay inside every configured bound.
    #[test]
    fn prop_composition_is_bounded(
        config in arb_composer_config(),
        budget in arb_army_budget(),
        census in arb_census(),
        seed in any::<u64>(),
    ) {
        let composer = ArmyComposer::new(config.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let army = composer.compose(&budget, &census, &mut rng).unwrap();

        for division in &army.divisions {
            prop_assert!(division.melee_pips <= EQUIPMENT_PIPS_MAX);
            prop_assert!(division.ranged_pips <= EQUIPMENT_PIPS_MAX);
            prop_assert!(division.armour_pips <= EQUIPMENT_PIPS_MAX);
            prop_assert!(division.melee_training >= config.melee_training.lower);
            prop_assert!(division.melee_training < config.melee_training.upper);
            prop_assert!(division.ranged_training >= config.ranged_training.lower);
            prop_assert!(division.ranged_training < config.ranged_training.upper);
        }

        let largest = census.iter().map(|r| r.population).max().unwrap();
        let first_largest = census.iter().find(|r| r.population == largest).unwrap().race;
        prop_assert!(army.divisions.iter().all(|d| d.race == first_largest));
    }

    /// Same seed, same army.
    #[test]
    fn prop_composition_is_deterministic(
        config in arb_composer_config(),
        budget in arb_army_budget(),
        census in arb_census(),
        seed in any::<u64>(),
    ) {
        let composer = ArmyComposer::new(config).unwrap();
        prop_assert!(verify_composition_determinism(&composer, &budget, &census, seed, 3));
    }

    /// More equipment never means fewer pips.
    #[test]
    fn prop_pips_are_monotonic(raw in 0u64..100_000, extra in 0u64..1_000, soldiers in 1u64..500) {
        prop_assert!(equipment_pips(raw, soldiers) <= equipment_pips(raw + extra, soldiers));
        prop_assert!(equipment_pips(raw, soldiers) <= EQUIPMENT_PIPS_MAX);
    }

    /// Division shares always add back up to the whole.
    #[test]
    fn prop_budget_division_shares_fit(wealth in any::<i64>()) {
        let division = ArmyBudgetDivision::from_wealth(wealth);
        prop_assert!(division.pawns() + division.weapons() + division.armour() <= division.total());
    }
}

#[test]
fn test_pip_edges() {
    assert_eq!(equipment_pips(0, 50), 0);
    assert_eq!(equipment_pips(50, 0), 0);
    assert_eq!(equipment_pips(u64::MAX, 1), EQUIPMENT_PIPS_MAX);
}

#[test]
fn test_settlement_to_army() {
    let division = ArmyBudgetDivision::from_wealth(400_000);
    let costs = UnitCosts {
        pawn: 1_000,
        melee: 50,
        ranged: 100,
        armour: 100,
    };
    let budget = porcupine_core::raid::ArmyBudget::from_division(&division, costs);
    let composer = ArmyComposer::new(Default::default()).unwrap();
    let census = [porcupine_core::raid::RacePopulation {
        race: RaceId(3),
        population: 1,
    }];

    let army = composer
        .compose(&budget, &census, &mut StdRng::seed_from_u64(11))
        .unwrap();

    // 25% of 400000 is 100000, 50% of that buys 50 pawns at 1000 each
    assert_eq!(army.total_soldiers, 50);
    assert_eq!(army.divisions.len(), 1);
    assert_eq!(army.fielded_soldiers(), 50);
    assert!(army.divisions.iter().all(|d| d.race == RaceId(3)));
}
