//! Wealth to budget split.

use serde::{Deserialize, Serialize};

/// Share of settlement wealth raiders invest, in percent.
pub const GARRISON_INVESTMENT_PERCENT: u64 = 25;
/// Share of the investment spent on pawns, in percent.
pub const PAWNS_PERCENT: u64 = 50;
/// Share of the investment spent on weapons, in percent.
pub const WEAPONS_PERCENT: u64 = 30;
/// Share of the investment spent on armour, in percent.
pub const ARMOUR_PERCENT: u64 = 20;

/// Budgets derived from one wealth figure. All values are silver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyBudgetDivision {
    total: u64,
    pawns: u64,
    weapons: u64,
    armour: u64,
}

impl ArmyBudgetDivision {
    /// Split `wealth`. Negative wealth is treated as zero.
    pub fn from_wealth(wealth: i64) -> Self {
        let wealth = u64::try_from(wealth).unwrap_or(0);
        let total = percent_of(wealth, GARRISON_INVESTMENT_PERCENT);
        Self {
            total,
            pawns: percent_of(total, PAWNS_PERCENT),
            weapons: percent_of(total, WEAPONS_PERCENT),
            armour: percent_of(total, ARMOUR_PERCENT),
        }
    }

    /// Invested share of the wealth.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Silver for recruiting pawns.
    pub const fn pawns(&self) -> u64 {
        self.pawns
    }

    /// Silver for melee and ranged weapons.
    pub const fn weapons(&self) -> u64 {
        self.weapons
    }

    /// Silver for armour.
    pub const fn armour(&self) -> u64 {
        self.armour
    }
}

fn percent_of(value: u64, percent: u64) -> u64 {
    // u128 keeps the multiplication exact for any u64 wealth.
    (u128::from(value) * u128::from(percent) / 100) as u64
}
