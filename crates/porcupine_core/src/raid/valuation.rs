//! Settlement valuation.
//!
//! Raiders price a settlement by what they could carry off: the stockpile at
//! its sell price, every citizen at the value of a pawn, and a share of the
//! settlement's riches. A pawn is worth a base amount plus the supplies it
//! would consume over the consumption period.

use serde::{Deserialize, Serialize};

use super::budget::ArmyBudgetDivision;
use super::composer::{ArmyBudget, UnitCosts};
use crate::statistics::Statistics;

/// Constants used to price a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Value of a pawn before supplies.
    pub base_pawn_value: f64,
    /// Rations a pawn eats per day.
    pub ration_per_day: f64,
    /// Drink a pawn consumes per day.
    pub drink_per_day: f64,
    /// Clothes a pawn wears out per day.
    pub clothes_per_day: f64,
    /// Share of the riches added to the wealth.
    pub riches_weight: f64,
    /// Years of consumption priced into a pawn.
    pub consumption_period_years: u32,
    /// Days in a game year.
    pub days_per_year: u32,
    /// Resource key of rations.
    pub ration_resource: String,
    /// Resource key of drink.
    pub drink_resource: String,
    /// Resource key of clothes.
    pub clothes_resource: String,
    /// Resource key of melee weapons.
    pub melee_resource: String,
    /// Resource key of ranged weapons.
    pub ranged_resource: String,
    /// Resource key of armour.
    pub armour_resource: String,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            base_pawn_value: 500.0,
            ration_per_day: 0.25,
            drink_per_day: 0.25,
            clothes_per_day: 0.04,
            riches_weight: 0.2,
            consumption_period_years: 5,
            days_per_year: 16,
            ration_resource: "RATION".to_string(),
            drink_resource: "_ALCOHOL".to_string(),
            clothes_resource: "CLOTHES".to_string(),
            melee_resource: "WEAPON".to_string(),
            ranged_resource: "BOW".to_string(),
            armour_resource: "ARMOUR".to_string(),
        }
    }
}

impl ValuationConfig {
    /// Days of consumption priced into a pawn.
    pub fn consumption_days(&self) -> f64 {
        f64::from(self.days_per_year) * f64::from(self.consumption_period_years)
    }
}

/// A settlement's price as seen by raiders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementValuation {
    /// Population at valuation time.
    pub population: u32,
    /// Value of one pawn.
    pub pawn_value: u64,
    /// Total settlement wealth.
    pub wealth: i64,
    /// Unit prices for raising an army.
    pub costs: UnitCosts,
}

impl SettlementValuation {
    /// Price the settlement from a statistics snapshot.
    pub fn assess(statistics: &Statistics, config: &ValuationConfig) -> Self {
        let pawn_value = pawn_value(statistics, config);
        let population = statistics.population.population();

        let stockpile: u64 = statistics
            .stockpile
            .iter()
            .map(|resource| resource.stockpile_value())
            .sum();
        let citizens = u64::from(population).saturating_mul(pawn_value);
        let riches = (statistics.riches as f64 * config.riches_weight) as i64;

        let wealth = i64::try_from(stockpile.saturating_add(citizens))
            .unwrap_or(i64::MAX)
            .saturating_add(riches);

        let buy = |key: &str| u64::from(statistics.stockpile.buy_price(key));
        Self {
            population,
            pawn_value,
            wealth,
            costs: UnitCosts {
                pawn: pawn_value,
                melee: buy(&config.melee_resource),
                ranged: buy(&config.ranged_resource),
                armour: buy(&config.armour_resource),
            },
        }
    }

    /// Split the wealth into budgets.
    pub fn budget_division(&self) -> ArmyBudgetDivision {
        ArmyBudgetDivision::from_wealth(self.wealth)
    }

    /// Budgets plus unit prices, ready for the composer.
    pub fn army_budget(&self) -> ArmyBudget {
        ArmyBudget::from_division(&self.budget_division(), self.costs)
    }
}

/// Base value plus priced supply consumption, truncated to whole silver.
pub fn pawn_value(statistics: &Statistics, config: &ValuationConfig) -> u64 {
    let days = config.consumption_days();
    let daily = |key: &str, rate: f64| f64::from(statistics.stockpile.buy_price(key)) * rate;

    let supplies = daily(&config.ration_resource, config.ration_per_day)
        + daily(&config.drink_resource, config.drink_per_day)
        + daily(&config.clothes_resource, config.clothes_per_day);

    (config.base_pawn_value + supplies * days).max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{EconomySource, PopulationCounts, ResourceMetadata};

    struct Town;

    impl EconomySource for Town {
        fn population(&self) -> PopulationCounts {
            PopulationCounts {
                population: 100,
                ..PopulationCounts::default()
            }
        }

        fn resources(&self) -> Vec<ResourceMetadata> {
            vec![
                ResourceMetadata::new("RATION", 10, 5, 200),
                ResourceMetadata::new("_ALCOHOL", 20, 10, 50),
                ResourceMetadata::new("CLOTHES", 50, 40, 10),
                ResourceMetadata::new("WEAPON", 120, 100, 0),
                ResourceMetadata::new("BOW", 90, 80, 0),
                ResourceMetadata::new("ARMOUR", 150, 130, 0),
            ]
        }

        fn riches(&self) -> i64 {
            5_000
        }
    }

    #[test]
    fn test_pawn_value() {
        let stats = Statistics::capture(&Town);
        // 80 days: rations 10*0.25*80 = 200, drink 20*0.25*80 = 400,
        // clothes 50*0.04*80 = 160
        assert_eq!(pawn_value(&stats, &ValuationConfig::default()), 1_260);
    }

    #[test]
    fn test_assess() {
        let stats = Statistics::capture(&Town);
        let valuation = SettlementValuation::assess(&stats, &ValuationConfig::default());

        // stockpile 200*5 + 50*10 + 10*40 = 1900
        // citizens 100 * 1260 = 126000
        // riches 5000 * 0.2 = 1000
        assert_eq!(valuation.population, 100);
        assert_eq!(valuation.wealth, 128_900);
        assert_eq!(
            valuation.costs,
            UnitCosts {
                pawn: 1_260,
                melee: 120,
                ranged: 90,
                armour: 150,
            }
        );

        let budget = valuation.army_budget();
        assert_eq!(budget.pawns, 16_112);
        assert_eq!(budget.cost_per_pawn, 1_260);
    }

    #[test]
    fn test_missing_resources_price_at_zero() {
        let stats = Statistics::default();
        let valuation = SettlementValuation::assess(&stats, &ValuationConfig::default());
        assert_eq!(valuation.pawn_value, 500);
        assert_eq!(valuation.wealth, 0);
        assert_eq!(valuation.costs.melee, 0);
    }

    #[test]
    fn test_config_from_ron() {
        let config: ValuationConfig = ron::from_str("(base_pawn_value: 250.0)").unwrap();
        assert!((config.base_pawn_value - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.days_per_year, 16);
        assert_eq!(config.melee_resource, "WEAPON");
    }
}
