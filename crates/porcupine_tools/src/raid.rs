//! Raid army calculator.
//!
//! Runs the same budget split and composer the raid event uses, without a
//! host, so mod authors can see what a given wealth figure would field.

use std::fmt;

use porcupine_core::raid::{
    ArmyBudget, ArmyBudgetDivision, ArmyComposer, ArmyComposition, ComposerConfig, RaceId,
    RacePopulation, UnitCosts,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;

/// Calculator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidInput {
    /// Settlement wealth in silver.
    pub wealth: i64,
    /// Unit prices.
    pub costs: UnitCosts,
    /// Composer settings.
    pub composer: ComposerConfig,
    /// Target region census; one race of population 1 when empty.
    pub census: Vec<RacePopulation>,
    /// Seed for training rolls.
    pub seed: u64,
}

/// Calculator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidPlan {
    /// Wealth split.
    pub division: ArmyBudgetDivision,
    /// Budget handed to the composer.
    pub budget: ArmyBudget,
    /// Resulting army.
    pub composition: ArmyComposition,
}

/// Compose the army `input` describes.
pub fn plan_raid(input: &RaidInput) -> Result<RaidPlan> {
    let composer = ArmyComposer::new(input.composer.clone())?;
    let division = ArmyBudgetDivision::from_wealth(input.wealth);
    let budget = ArmyBudget::from_division(&division, input.costs);

    let census = if input.census.is_empty() {
        vec![RacePopulation {
            race: RaceId(0),
            population: 1,
        }]
    } else {
        input.census.clone()
    };

    let mut rng = StdRng::seed_from_u64(input.seed);
    let composition = composer.compose(&budget, &census, &mut rng)?;
    tracing::debug!(
        "Wealth {} fields {} soldiers in {} divisions",
        input.wealth,
        composition.fielded_soldiers(),
        composition.divisions.len()
    );

    Ok(RaidPlan {
        division,
        budget,
        composition,
    })
}

impl fmt::Display for RaidPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Invested {} silver: pawns {}, weapons {}, armour {}",
            self.division.total(),
            self.division.pawns(),
            self.division.weapons(),
            self.division.armour()
        )?;
        writeln!(
            f,
            "{} soldiers budgeted, {} fielded in {} divisions",
            self.composition.total_soldiers,
            self.composition.fielded_soldiers(),
            self.composition.divisions.len()
        )?;
        for (index, division) in self.composition.divisions.iter().enumerate() {
            writeln!(
                f,
                "  #{index}: race {} x{} melee {}/8 ranged {}/8 armour {}/8 training {}/{}",
                division.race.0,
                division.soldiers,
                division.melee_pips,
                division.ranged_pips,
                division.armour_pips,
                division.melee_training,
                division.ranged_training
            )?;
        }
        Ok(())
    }
}
