//! Raider armies.
//!
//! A raid converts settlement wealth into a hostile army:
//!
//! 1. [`valuation`] prices the settlement (stockpile, population, riches)
//! 2. [`budget`] splits a share of that wealth into pawn/weapon/armour budgets
//! 3. [`composer`] turns the budgets into divisions with equipment pips
//! 4. [`event`] ties it together as a scripted global event

pub mod budget;
pub mod composer;
pub mod event;
pub mod valuation;

pub use budget::ArmyBudgetDivision;
pub use composer::{
    ArmyBudget, ArmyComposer, ArmyComposition, ComposerConfig, ComposerError, DivisionAllocation,
    DivisionPlan, RaceId, RacePopulation, TrainingRange, UnitCosts,
};
pub use event::{RaidConfig, RaidError, RaidEvent, RaidHost, RaidReport};
pub use valuation::{SettlementValuation, ValuationConfig};
