//! Raider army composition.
//!
//! Converts pawn/weapon/armour budgets into a list of divisions. Soldiers are
//! bought at `cost_per_pawn`; each division holds at most
//! `pawns_per_division` soldiers. Equipment is split evenly over the
//! divisions still to be created, so earlier divisions get the floor share
//! and the last division gets whatever is left.
//!
//! ```
//! use porcupine_core::raid::{ArmyBudget, ArmyComposer, ComposerConfig};
//!
//! let composer = ArmyComposer::new(ComposerConfig::default()).unwrap();
//! let budget = ArmyBudget {
//!     pawns: 10_000,
//!     weapons: 0,
//!     armour: 0,
//!     cost_per_pawn: 500,
//!     cost_melee: 1,
//!     cost_ranged: 1,
//!     cost_armour: 1,
//! };
//!
//! let plan = composer.plan_allocations(&budget).unwrap();
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].soldiers, 20);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::budget::ArmyBudgetDivision;

/// Highest equipment level of a division.
pub const EQUIPMENT_PIPS_MAX: u32 = 8;

/// Default soldiers per full division.
pub const DEFAULT_PAWNS_PER_DIVISION: u64 = 50;

/// Default smallest army a raid may field.
pub const DEFAULT_MIN_ARMY_SIZE: u64 = 10;

/// Errors from composer configuration or input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposerError {
    /// `pawns_per_division` was zero.
    #[error("pawns_per_division must be greater than zero")]
    ZeroDivisionSize,

    /// The minimum army does not fit in one division.
    #[error("min_army_size ({min_army_size}) exceeds pawns_per_division ({pawns_per_division})")]
    MinArmyExceedsDivision {
        /// Configured minimum.
        min_army_size: u64,
        /// Configured division size.
        pawns_per_division: u64,
    },

    /// A training range is empty.
    #[error("{kind} training range [{lower}, {upper}) is empty")]
    EmptyTrainingRange {
        /// Which range.
        kind: &'static str,
        /// Inclusive lower bound.
        lower: u32,
        /// Exclusive upper bound.
        upper: u32,
    },

    /// A unit cost was zero.
    #[error("cost per {item} must be greater than zero")]
    ZeroCost {
        /// Which cost.
        item: &'static str,
    },

    /// The target region has no races to draw soldiers from.
    #[error("target region has no race census")]
    EmptyCensus,
}

/// Half-open training level range `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingRange {
    /// Inclusive lower bound.
    pub lower: u32,
    /// Exclusive upper bound.
    pub upper: u32,
}

impl TrainingRange {
    /// Create a range.
    pub const fn new(lower: u32, upper: u32) -> Self {
        Self { lower, upper }
    }

    /// Draw a level uniformly.
    ///
    /// Only call on a validated range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.lower..self.upper)
    }
}

impl Default for TrainingRange {
    fn default() -> Self {
        Self::new(0, 6)
    }
}

/// Composer settings, validated once by [`ArmyComposer::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Soldiers in a full division.
    #[serde(default = "default_pawns_per_division")]
    pub pawns_per_division: u64,

    /// Armies smaller than this are raised to exactly this size.
    #[serde(default = "default_min_army_size")]
    pub min_army_size: u64,

    /// Melee training levels.
    #[serde(default)]
    pub melee_training: TrainingRange,

    /// Ranged training levels.
    #[serde(default)]
    pub ranged_training: TrainingRange,
}

fn default_pawns_per_division() -> u64 {
    DEFAULT_PAWNS_PER_DIVISION
}

fn default_min_army_size() -> u64 {
    DEFAULT_MIN_ARMY_SIZE
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            pawns_per_division: DEFAULT_PAWNS_PER_DIVISION,
            min_army_size: DEFAULT_MIN_ARMY_SIZE,
            melee_training: TrainingRange::default(),
            ranged_training: TrainingRange::default(),
        }
    }
}

impl ComposerConfig {
    /// Check every constraint.
    pub fn validate(&self) -> Result<(), ComposerError> {
        if self.pawns_per_division == 0 {
            return Err(ComposerError::ZeroDivisionSize);
        }
        if self.min_army_size > self.pawns_per_division {
            return Err(ComposerError::MinArmyExceedsDivision {
                min_army_size: self.min_army_size,
                pawns_per_division: self.pawns_per_division,
            });
        }
        for (kind, range) in [
            ("melee", self.melee_training),
            ("ranged", self.ranged_training),
        ] {
            if range.lower >= range.upper {
                return Err(ComposerError::EmptyTrainingRange {
                    kind,
                    lower: range.lower,
                    upper: range.upper,
                });
            }
        }
        Ok(())
    }
}

/// Unit prices in silver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitCosts {
    /// One recruited soldier.
    pub pawn: u64,
    /// One melee weapon.
    pub melee: u64,
    /// One ranged weapon.
    pub ranged: u64,
    /// One suit of armour.
    pub armour: u64,
}

/// Budgets and unit costs for one army.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyBudget {
    /// Silver for soldiers.
    pub pawns: u64,
    /// Silver for weapons; melee and ranged each draw on all of it.
    pub weapons: u64,
    /// Silver for armour.
    pub armour: u64,
    /// Price of one soldier.
    pub cost_per_pawn: u64,
    /// Price of one melee weapon.
    pub cost_melee: u64,
    /// Price of one ranged weapon.
    pub cost_ranged: u64,
    /// Price of one suit of armour.
    pub cost_armour: u64,
}

impl ArmyBudget {
    /// Combine a budget split with unit prices.
    pub fn from_division(division: &ArmyBudgetDivision, costs: UnitCosts) -> Self {
        Self {
            pawns: division.pawns(),
            weapons: division.weapons(),
            armour: division.armour(),
            cost_per_pawn: costs.pawn,
            cost_melee: costs.melee,
            cost_ranged: costs.ranged,
            cost_armour: costs.armour,
        }
    }

    /// Reject zero costs.
    pub fn validate(&self) -> Result<(), ComposerError> {
        for (item, cost) in [
            ("pawn", self.cost_per_pawn),
            ("melee weapon", self.cost_melee),
            ("ranged weapon", self.cost_ranged),
            ("armour", self.cost_armour),
        ] {
            if cost == 0 {
                return Err(ComposerError::ZeroCost { item });
            }
        }
        Ok(())
    }

    /// Soldiers the pawn budget buys. Fractional silver is discarded.
    pub fn soldier_count(&self) -> Result<u64, ComposerError> {
        self.validate()?;
        Ok(self.pawns / self.cost_per_pawn)
    }
}

/// Raw soldiers and equipment for one division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DivisionAllocation {
    /// Soldiers.
    pub soldiers: u64,
    /// Melee weapons.
    pub melee: u64,
    /// Ranged weapons.
    pub ranged: u64,
    /// Suits of armour.
    pub armour: u64,
}

/// Host race identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaceId(pub u32);

/// Population of one race in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RacePopulation {
    /// Race.
    pub race: RaceId,
    /// Head count.
    pub population: u64,
}

/// One division ready for the host to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DivisionPlan {
    /// Race of every soldier.
    pub race: RaceId,
    /// Soldiers.
    pub soldiers: u64,
    /// Melee equipment level, `0..=8`.
    pub melee_pips: u32,
    /// Ranged equipment level, `0..=8`.
    pub ranged_pips: u32,
    /// Armour level, `0..=8`.
    pub armour_pips: u32,
    /// Melee training level.
    pub melee_training: u32,
    /// Ranged training level.
    pub ranged_training: u32,
}

/// A composed army.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyComposition {
    /// Soldiers the pawn budget bought.
    pub total_soldiers: u64,
    /// Divisions in creation order.
    pub divisions: Vec<DivisionPlan>,
}

impl ArmyComposition {
    /// Soldiers across all divisions. Differs from `total_soldiers` only
    /// when the minimum army size was applied.
    pub fn fielded_soldiers(&self) -> u64 {
        self.divisions.iter().map(|d| d.soldiers).sum()
    }
}

/// Equipment level per soldier.
///
/// Scales `raw` linearly against the maximum of `soldiers * 8` items and
/// floors to an integer level, clamped to `0..=8`. An empty division gets 0.
pub fn equipment_pips(raw: u64, soldiers: u64) -> u32 {
    if soldiers == 0 {
        return 0;
    }
    // floor(raw / (soldiers * 8) * 8) == floor(raw / soldiers)
    let pips = (raw / soldiers).min(u64::from(EQUIPMENT_PIPS_MAX));
    pips as u32
}

/// Race with the largest population. Ties go to the earliest entry; an
/// all-zero census gives the first race.
pub fn largest_race(census: &[RacePopulation]) -> Option<RaceId> {
    let mut entries = census.iter();
    let mut best = entries.next()?;
    for entry in entries {
        if entry.population > best.population {
            best = entry;
        }
    }
    Some(best.race)
}

/// Turns budgets into divisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmyComposer {
    config: ComposerConfig,
}

impl ArmyComposer {
    /// Validate `config` and build a composer.
    pub fn new(config: ComposerConfig) -> Result<Self, ComposerError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Number of divisions `total` soldiers fill.
    pub fn division_count(&self, total: u64) -> u64 {
        total.div_ceil(self.config.pawns_per_division)
    }

    /// Split soldiers and equipment into divisions.
    ///
    /// Deterministic: no race or training is assigned here.
    pub fn plan_allocations(
        &self,
        budget: &ArmyBudget,
    ) -> Result<Vec<DivisionAllocation>, ComposerError> {
        let total = budget.soldier_count()?;
        let mut melee = budget.weapons / budget.cost_melee;
        let mut ranged = budget.weapons / budget.cost_ranged;
        let mut armour = budget.armour / budget.cost_armour;

        if total < self.config.min_army_size {
            return Ok(vec![DivisionAllocation {
                soldiers: self.config.min_army_size,
                melee,
                ranged,
                armour,
            }]);
        }

        let per_division = self.config.pawns_per_division;
        let remainder = total % per_division;
        let mut divisions_left = self.division_count(total);
        let mut remaining = total;
        let mut allocations = Vec::new();

        while remaining >= per_division {
            let allocation = DivisionAllocation {
                soldiers: per_division,
                melee: melee / divisions_left,
                ranged: ranged / divisions_left,
                armour: armour / divisions_left,
            };
            melee -= allocation.melee;
            ranged -= allocation.ranged;
            armour -= allocation.armour;
            divisions_left -= 1;
            remaining -= per_division;
            allocations.push(allocation);
        }

        if remainder > 0 {
            allocations.push(DivisionAllocation {
                soldiers: remainder,
                melee,
                ranged,
                armour,
            });
        }

        Ok(allocations)
    }

    /// Compose a full army against the target region's `census`.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        budget: &ArmyBudget,
        census: &[RacePopulation],
        rng: &mut R,
    ) -> Result<ArmyComposition, ComposerError> {
        let allocations = self.plan_allocations(budget)?;
        let race = largest_race(census).ok_or(ComposerError::EmptyCensus)?;

        let divisions = allocations
            .into_iter()
            .map(|allocation| DivisionPlan {
                race,
                soldiers: allocation.soldiers,
                melee_pips: equipment_pips(allocation.melee, allocation.soldiers),
                ranged_pips: equipment_pips(allocation.ranged, allocation.soldiers),
                armour_pips: equipment_pips(allocation.armour, allocation.soldiers),
                melee_training: self.config.melee_training.sample(rng),
                ranged_training: self.config.ranged_training.sample(rng),
            })
            .collect();

        Ok(ArmyComposition {
            total_soldiers: budget.soldier_count()?,
            divisions,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn budget(pawns: u64, weapons: u64, armour: u64) -> ArmyBudget {
        ArmyBudget {
            pawns,
            weapons,
            armour,
            cost_per_pawn: 500,
            cost_melee: 100,
            cost_ranged: 200,
            cost_armour: 100,
        }
    }

    fn composer() -> ArmyComposer {
        ArmyComposer::new(ComposerConfig::default()).unwrap()
    }

    fn census() -> Vec<RacePopulation> {
        vec![
            RacePopulation {
                race: RaceId(0),
                population: 40,
            },
            RacePopulation {
                race: RaceId(1),
                population: 90,
            },
            RacePopulation {
                race: RaceId(2),
                population: 90,
            },
        ]
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ComposerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configs() {
        let zero = ComposerConfig {
            pawns_per_division: 0,
            ..ComposerConfig::default()
        };
        assert_eq!(ArmyComposer::new(zero), Err(ComposerError::ZeroDivisionSize));

        let too_big_min = ComposerConfig {
            min_army_size: 60,
            ..ComposerConfig::default()
        };
        assert!(matches!(
            too_big_min.validate(),
            Err(ComposerError::MinArmyExceedsDivision { .. })
        ));

        let empty_range = ComposerConfig {
            ranged_training: TrainingRange::new(3, 3),
            ..ComposerConfig::default()
        };
        assert!(matches!(
            empty_range.validate(),
            Err(ComposerError::EmptyTrainingRange { kind: "ranged", .. })
        ));
    }

    #[test]
    fn test_config_from_ron_uses_defaults() {
        let config: ComposerConfig = ron::from_str("(pawns_per_division: 40)").unwrap();
        assert_eq!(config.pawns_per_division, 40);
        assert_eq!(config.min_army_size, DEFAULT_MIN_ARMY_SIZE);
        assert_eq!(config.melee_training, TrainingRange::new(0, 6));
    }

    #[test]
    fn test_zero_cost_rejected() {
        let mut b = budget(10_000, 0, 0);
        b.cost_ranged = 0;
        assert_eq!(
            composer().plan_allocations(&b),
            Err(ComposerError::ZeroCost {
                item: "ranged weapon"
            })
        );
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    #[test]
    fn test_remainder_only_scenario() {
        // 10000 / 500 = 20 soldiers, less than one division of 50
        let plan = composer().plan_allocations(&budget(10_000, 0, 0)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].soldiers, 20);
        assert_eq!(composer().division_count(20), 1);
    }

    #[test]
    fn test_min_army_floor() {
        // 2000 / 500 = 4 soldiers, raised to the minimum of 10
        let plan = composer()
            .plan_allocations(&budget(2_000, 1_000, 500))
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].soldiers, DEFAULT_MIN_ARMY_SIZE);
        assert_eq!(plan[0].melee, 10);
        assert_eq!(plan[0].ranged, 5);
        assert_eq!(plan[0].armour, 5);
    }

    #[test]
    fn test_full_divisions_and_remainder() {
        // 120 soldiers: two divisions of 50 and one of 20
        // melee 100, ranged 50, armour 33
        let plan = composer()
            .plan_allocations(&budget(60_000, 10_000, 3_300))
            .unwrap();
        let soldiers: Vec<u64> = plan.iter().map(|d| d.soldiers).collect();
        assert_eq!(soldiers, vec![50, 50, 20]);

        // melee: 100/3 = 33, 67/2 = 33, remainder 34
        assert_eq!(
            plan.iter().map(|d| d.melee).collect::<Vec<_>>(),
            vec![33, 33, 34]
        );
        // ranged: 50/3 = 16, 34/2 = 17, remainder 17
        assert_eq!(
            plan.iter().map(|d| d.ranged).collect::<Vec<_>>(),
            vec![16, 17, 17]
        );
        // armour: 33/3 = 11, 22/2 = 11, remainder 11
        assert_eq!(
            plan.iter().map(|d| d.armour).collect::<Vec<_>>(),
            vec![11, 11, 11]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_remainder_division() {
        let plan = composer()
            .plan_allocations(&budget(50_000, 1_000, 0))
            .unwrap();
        assert_eq!(plan.len(), 2);
        // 10 melee: 10/2 = 5, then 5/1 = 5
        assert_eq!(plan[0].melee, 5);
        assert_eq!(plan[1].melee, 5);
    }

    // ========================================================================
    // Pips and races
    // ========================================================================

    #[test]
    fn test_equipment_pips() {
        assert_eq!(equipment_pips(0, 20), 0);
        assert_eq!(equipment_pips(160, 20), 8);
        assert_eq!(equipment_pips(1_000, 20), 8);
        assert_eq!(equipment_pips(39, 20), 1);
        assert_eq!(equipment_pips(40, 20), 2);
        assert_eq!(equipment_pips(10, 0), 0);
    }

    #[test]
    fn test_largest_race_ties_go_first() {
        assert_eq!(largest_race(&census()), Some(RaceId(1)));
        assert_eq!(largest_race(&[]), None);

        let zeros = [
            RacePopulation {
                race: RaceId(7),
                population: 0,
            },
            RacePopulation {
                race: RaceId(3),
                population: 0,
            },
        ];
        assert_eq!(largest_race(&zeros), Some(RaceId(7)));
    }

    #[test]
    fn test_compose() {
        let mut rng = StdRng::seed_from_u64(7);
        let army = composer()
            .compose(&budget(60_000, 10_000, 3_300), &census(), &mut rng)
            .unwrap();

        assert_eq!(army.total_soldiers, 120);
        assert_eq!(army.fielded_soldiers(), 120);
        assert_eq!(army.divisions.len(), 3);
        for division in &army.divisions {
            assert_eq!(division.race, RaceId(1));
            assert!(division.melee_training < 6);
            assert!(division.ranged_training < 6);
            assert!(division.armour_pips <= EQUIPMENT_PIPS_MAX);
        }
        // 34 melee over 20 soldiers
        assert_eq!(army.divisions[2].melee_pips, 1);
    }

    #[test]
    fn test_compose_is_deterministic_under_seed() {
        let b = budget(60_000, 10_000, 3_300);
        let a = composer()
            .compose(&b, &census(), &mut StdRng::seed_from_u64(11))
            .unwrap();
        let c = composer()
            .compose(&b, &census(), &mut StdRng::seed_from_u64(11))
            .unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_compose_requires_census() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            composer().compose(&budget(10_000, 0, 0), &[], &mut rng),
            Err(ComposerError::EmptyCensus)
        );
    }
}
