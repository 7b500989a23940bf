//! Cached settlement statistics.
//!
//! The host exposes its economy through [`EconomySource`]. Caches implement
//! [`StatisticsCache`] and are refreshed by the dispatcher at the start of
//! every update, so event code reads one consistent snapshot per tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host view of the settlement economy.
pub trait EconomySource {
    /// Current population counts.
    fn population(&self) -> PopulationCounts;

    /// Price and stockpile data for every resource.
    fn resources(&self) -> Vec<ResourceMetadata>;

    /// Accumulated settlement riches.
    fn riches(&self) -> i64;
}

/// A cache refreshed from the host each update.
pub trait StatisticsCache {
    /// Re-read from the host.
    fn refresh(&mut self, source: &dyn EconomySource);
}

/// Population counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopulationCounts {
    /// Total citizens.
    pub population: u32,
    /// Nobles.
    pub nobles: u32,
    /// Citizens about to leave.
    pub emigrating: u32,
    /// Slaves owned by the settlement.
    pub owned_slaves: u32,
    /// Slaves owned by other factions.
    pub foreign_slaves: u32,
    /// Deaths counted as wrongful.
    pub wrongful_deaths: u32,
}

/// Cached [`PopulationCounts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationStats {
    counts: PopulationCounts,
}

impl PopulationStats {
    /// Latest counts.
    pub fn counts(&self) -> &PopulationCounts {
        &self.counts
    }

    /// Latest total population.
    pub fn population(&self) -> u32 {
        self.counts.population
    }
}

impl StatisticsCache for PopulationStats {
    fn refresh(&mut self, source: &dyn EconomySource) {
        self.counts = source.population();
    }
}

/// Market data for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Resource key, e.g. `RATION`.
    pub key: String,
    /// Price the settlement pays per unit.
    pub buy_price: u32,
    /// Price the settlement receives per unit.
    pub sell_price: u32,
    /// Units in the stockpile.
    pub stockpile: u32,
}

impl ResourceMetadata {
    /// Metadata for `key`.
    pub fn new(key: impl Into<String>, buy_price: u32, sell_price: u32, stockpile: u32) -> Self {
        Self {
            key: key.into(),
            buy_price,
            sell_price,
            stockpile,
        }
    }

    /// Value of the stockpile at the sell price.
    pub fn stockpile_value(&self) -> u64 {
        u64::from(self.stockpile) * u64::from(self.sell_price)
    }
}

/// Cached market data keyed by resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockpileStatistics {
    resources: BTreeMap<String, ResourceMetadata>,
}

impl StockpileStatistics {
    /// Metadata for `key`.
    pub fn get(&self, key: &str) -> Option<&ResourceMetadata> {
        self.resources.get(key)
    }

    /// Buy price of `key`, zero when unknown.
    pub fn buy_price(&self, key: &str) -> u32 {
        self.get(key).map_or(0, |r| r.buy_price)
    }

    /// All resources in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceMetadata> {
        self.resources.values()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True before the first refresh.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl StatisticsCache for StockpileStatistics {
    fn refresh(&mut self, source: &dyn EconomySource) {
        self.resources = source
            .resources()
            .into_iter()
            .map(|r| (r.key.clone(), r))
            .collect();
    }
}

/// All settlement statistics in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Population counters.
    pub population: PopulationStats,
    /// Market data.
    pub stockpile: StockpileStatistics,
    /// Settlement riches.
    pub riches: i64,
}

impl Statistics {
    /// Take a fresh snapshot.
    pub fn capture(source: &dyn EconomySource) -> Self {
        let mut statistics = Self::default();
        statistics.refresh_all(source);
        statistics
    }

    /// Refresh every cache.
    pub fn refresh_all(&mut self, source: &dyn EconomySource) {
        self.population.refresh(source);
        self.stockpile.refresh(source);
        self.riches = source.riches();
    }
}

impl StatisticsCache for Statistics {
    fn refresh(&mut self, source: &dyn EconomySource) {
        self.refresh_all(source);
    }
}
