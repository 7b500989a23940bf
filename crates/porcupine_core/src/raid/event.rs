//! The raid scripted event.
//!
//! When it fires, the event prices the settlement, finds a region next to
//! the player's territory to stage from, spawns a rebel army there and fills
//! it with divisions composed against the target region's population.
//!
//! The settlement is priced from a shared [`Statistics`] cache when one is
//! attached, so the raid sees the snapshot the dispatcher took this tick.
//! Without one it captures its own.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::composer::{ArmyBudget, ArmyComposer, ArmyComposition, ComposerConfig, ComposerError};
use super::composer::{DivisionPlan, RacePopulation};
use super::valuation::{SettlementValuation, ValuationConfig};
use crate::capability::{Facets, ScriptEntity, Shared};
use crate::class_space::ClassRegistry;
use crate::config::ModuleConfig;
use crate::error::ConstructError;
use crate::events::GlobalEvent;
use crate::statistics::{EconomySource, Statistics};

/// Class name the raid event registers under.
pub const RAID_EVENT_CLASS: &str = "org.porcupine.events.RaidEvent";

/// Host world region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Host world army.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

/// What the host shows the player when raiders appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidNotice {
    /// Soldiers the raiders could afford.
    pub soldier_count: u64,
    /// The spawned army.
    pub army: ArmyId,
    /// Region the raiders march on.
    pub target: RegionId,
}

/// World services a raid needs from the host.
pub trait RaidHost {
    /// Whether the player's settlement exists yet.
    fn settlement_present(&self) -> bool;

    /// Settlement economy.
    fn economy(&self) -> &dyn EconomySource;

    /// A region, not owned by the player but adjacent to it, where a rebel
    /// army may spawn.
    fn staging_region(&mut self) -> Option<RegionId>;

    /// Spawn an empty rebel army in `staging`.
    fn spawn_raider_army(&mut self, staging: RegionId) -> Option<ArmyId>;

    /// Player region adjacent to `staging`.
    fn target_region(&mut self, staging: RegionId) -> Option<RegionId>;

    /// Race populations of `region` in race enumeration order.
    fn race_census(&self, region: RegionId) -> Vec<RacePopulation>;

    /// Add a division to `army`.
    fn create_division(&mut self, army: ArmyId, division: &DivisionPlan);

    /// Fill `army`'s supplies so it can reach its target.
    fn resupply_army(&mut self, _army: ArmyId) {}

    /// Tell the player.
    fn announce_raid(&mut self, notice: &RaidNotice);
}

/// Errors that stop a raid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaidError {
    /// There is no settlement to raid yet.
    #[error("no settlement present")]
    NoSettlement,

    /// No region qualifies as a staging area.
    #[error("no suitable region found to spawn raid in")]
    NoStagingRegion,

    /// The host refused to create the army.
    #[error("failed to create rebel army in staging region {0:?}")]
    SpawnFailed(RegionId),

    /// The staging region borders no player region.
    #[error("failed to find target region for staging region {0:?}")]
    NoTargetRegion(RegionId),

    /// The composer rejected its input.
    #[error("army composition failed: {0}")]
    Composer(#[from] ComposerError),
}

/// Raid settings, loadable from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidConfig {
    /// Expected raids per second of game time; zero disables raids.
    #[serde(default)]
    pub chance_per_second: f64,

    /// Seed for training rolls; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Army composition settings.
    #[serde(default)]
    pub composer: ComposerConfig,

    /// Settlement pricing constants.
    #[serde(default)]
    pub valuation: ValuationConfig,
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self {
            chance_per_second: 0.0,
            seed: None,
            composer: ComposerConfig::default(),
            valuation: ValuationConfig::default(),
        }
    }
}

impl RaidConfig {
    /// Parse a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Apply `raid.*` keys from a mod config. Unparsable values are ignored.
    pub fn with_overrides(mut self, config: &ModuleConfig) -> Self {
        if let Some(chance) = config.get_parsed("raid.chance_per_second") {
            self.chance_per_second = chance;
        }
        if let Some(seed) = config.get_parsed("raid.seed") {
            self.seed = Some(seed);
        }
        if let Some(size) = config.get_parsed("raid.pawns_per_division") {
            self.composer.pawns_per_division = size;
        }
        if let Some(size) = config.get_parsed("raid.min_army_size") {
            self.composer.min_army_size = size;
        }
        self
    }
}

/// Everything one raid decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidReport {
    /// Settlement price.
    pub valuation: SettlementValuation,
    /// Budgets handed to the composer.
    pub budget: ArmyBudget,
    /// Region the army spawned in.
    pub staging: RegionId,
    /// Region the army marches on.
    pub target: RegionId,
    /// The spawned army.
    pub army: ArmyId,
    /// Divisions created.
    pub composition: ArmyComposition,
}

/// Raid global event.
pub struct RaidEvent {
    config: RaidConfig,
    composer: ArmyComposer,
    host: Shared<dyn RaidHost>,
    statistics: Option<Shared<Statistics>>,
    rng: StdRng,
    raids: u32,
    last_report: Option<RaidReport>,
}

impl RaidEvent {
    /// Build from a validated config.
    pub fn new(config: RaidConfig, host: Shared<dyn RaidHost>) -> Result<Self, ComposerError> {
        let composer = ArmyComposer::new(config.composer.clone())?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            config,
            composer,
            host,
            statistics: None,
            rng,
            raids: 0,
            last_report: None,
        })
    }

    /// Value the settlement from `cache` instead of a fresh snapshot. The
    /// cache is expected to be refreshed elsewhere, normally by handing it to
    /// [`Dispatcher::with_statistics`](crate::dispatcher::Dispatcher::with_statistics).
    pub fn with_statistics(mut self, cache: Shared<Statistics>) -> Self {
        self.statistics = Some(cache);
        self
    }

    /// Register the event class, bound to `host`. Each mod that ships the
    /// class gets an instance configured from `base` plus its `raid.*` keys,
    /// reading `statistics` when given.
    pub fn register(
        registry: &mut ClassRegistry,
        base: RaidConfig,
        host: Shared<dyn RaidHost>,
        statistics: Option<Shared<Statistics>>,
    ) -> bool {
        registry.register_global_event(RAID_EVENT_CLASS, move |context| {
            let config = base.clone().with_overrides(&context.config().borrow());
            let mut event = Self::new(config, host.clone())
                .map_err(|err| ConstructError::new(err.to_string()))?;
            if let Some(cache) = &statistics {
                event = event.with_statistics(cache.clone());
            }
            Ok(Facets::new(event).entity().global_event())
        })
    }

    /// Active settings.
    pub fn config(&self) -> &RaidConfig {
        &self.config
    }

    /// Raids triggered successfully.
    pub fn raids(&self) -> u32 {
        self.raids
    }

    /// Report of the latest successful raid.
    pub fn last_report(&self) -> Option<&RaidReport> {
        self.last_report.as_ref()
    }

    /// Run one raid now.
    ///
    /// The host world is only changed once the army is fully composed, so a
    /// raid that fails leaves no empty army behind.
    pub fn trigger_raid(&mut self) -> Result<RaidReport, RaidError> {
        let mut host = self.host.borrow_mut();
        if !host.settlement_present() {
            return Err(RaidError::NoSettlement);
        }

        let valuation = match &self.statistics {
            Some(cache) => SettlementValuation::assess(&cache.borrow(), &self.config.valuation),
            None => SettlementValuation::assess(
                &Statistics::capture(host.economy()),
                &self.config.valuation,
            ),
        };
        let budget = valuation.army_budget();
        budget.validate()?;

        tracing::info!(
            "Triggering raid event, population: {}, wealth: {}",
            valuation.population,
            valuation.wealth
        );

        let staging = host.staging_region().ok_or(RaidError::NoStagingRegion)?;
        let target = host
            .target_region(staging)
            .ok_or(RaidError::NoTargetRegion(staging))?;
        let census = host.race_census(target);
        let composition = self.composer.compose(&budget, &census, &mut self.rng)?;

        let army = host
            .spawn_raider_army(staging)
            .ok_or(RaidError::SpawnFailed(staging))?;
        for division in &composition.divisions {
            host.create_division(army, division);
        }
        host.resupply_army(army);

        host.announce_raid(&RaidNotice {
            soldier_count: composition.total_soldiers,
            army,
            target,
        });
        drop(host);

        let report = RaidReport {
            valuation,
            budget,
            staging,
            target,
            army,
            composition,
        };
        self.raids += 1;
        self.last_report = Some(report.clone());
        Ok(report)
    }
}

impl ScriptEntity for RaidEvent {
    fn on_initialize_late(&mut self) {
        tracing::debug!(
            "Raid event ready, chance per second: {}",
            self.config.chance_per_second
        );
    }
}

impl GlobalEvent for RaidEvent {
    fn on_event(&mut self) {
        match self.trigger_raid() {
            Ok(report) => tracing::info!(
                "Raiders spawned: {} soldiers in {} divisions",
                report.composition.fielded_soldiers(),
                report.composition.divisions.len()
            ),
            Err(err) => tracing::warn!("Raid aborted: {}", err),
        }
    }

    fn chance_per_second(&self) -> f64 {
        self.config.chance_per_second
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;
    use crate::class_space::ClassDefinition;
    use crate::config::ModuleContext;
    use crate::descriptor::{ModuleDescriptor, ModulePaths};
    use crate::dispatcher::{Dispatcher, HostWorld};
    use crate::events::{RoomDirectory, RoomInstance};
    use crate::raid::composer::RaceId;
    use crate::registry::LoadedModules;
    use crate::statistics::{PopulationCounts, ResourceMetadata, StatisticsCache};
    use crate::version::Version;

    #[derive(Default)]
    struct World {
        settled: bool,
        staging: Option<RegionId>,
        target: Option<RegionId>,
        market: Vec<ResourceMetadata>,
        census: Vec<RacePopulation>,
        spawned: Vec<RegionId>,
        divisions: Vec<DivisionPlan>,
        notices: Vec<RaidNotice>,
        resupplied: Vec<ArmyId>,
    }

    impl EconomySource for World {
        fn population(&self) -> PopulationCounts {
            PopulationCounts {
                population: 100,
                ..PopulationCounts::default()
            }
        }

        fn resources(&self) -> Vec<ResourceMetadata> {
            self.market.clone()
        }

        fn riches(&self) -> i64 {
            0
        }
    }

    impl RaidHost for World {
        fn settlement_present(&self) -> bool {
            self.settled
        }

        fn economy(&self) -> &dyn EconomySource {
            self
        }

        fn staging_region(&mut self) -> Option<RegionId> {
            self.staging
        }

        fn spawn_raider_army(&mut self, staging: RegionId) -> Option<ArmyId> {
            self.spawned.push(staging);
            Some(ArmyId(9))
        }

        fn target_region(&mut self, _staging: RegionId) -> Option<RegionId> {
            self.target
        }

        fn race_census(&self, _region: RegionId) -> Vec<RacePopulation> {
            self.census.clone()
        }

        fn create_division(&mut self, _army: ArmyId, division: &DivisionPlan) {
            self.divisions.push(*division);
        }

        fn resupply_army(&mut self, army: ArmyId) {
            self.resupplied.push(army);
        }

        fn announce_raid(&mut self, notice: &RaidNotice) {
            self.notices.push(notice.clone());
        }
    }

    fn market() -> Vec<ResourceMetadata> {
        vec![
            ResourceMetadata::new("WEAPON", 100, 80, 0),
            ResourceMetadata::new("BOW", 100, 80, 0),
            ResourceMetadata::new("ARMOUR", 100, 80, 0),
        ]
    }

    fn world(settled: bool, staging: Option<RegionId>) -> Rc<RefCell<World>> {
        Rc::new(RefCell::new(World {
            settled,
            staging,
            target: Some(RegionId(2)),
            market: market(),
            census: vec![RacePopulation {
                race: RaceId(4),
                population: 100,
            }],
            ..World::default()
        }))
    }

    fn assert_untouched(world: &World) {
        assert!(world.spawned.is_empty());
        assert!(world.divisions.is_empty());
        assert!(world.notices.is_empty());
    }

    fn seeded() -> RaidConfig {
        RaidConfig {
            seed: Some(1),
            ..RaidConfig::default()
        }
    }

    #[test]
    fn test_trigger_raid() {
        let world = world(true, Some(RegionId(1)));
        let mut event = RaidEvent::new(seeded(), world.clone()).unwrap();

        let report = event.trigger_raid().unwrap();

        // pawn value 500, wealth 100 * 500 = 50000, pawns budget 6250 -> 12
        assert_eq!(report.valuation.wealth, 50_000);
        assert_eq!(report.composition.total_soldiers, 12);
        assert_eq!(report.staging, RegionId(1));
        assert_eq!(report.target, RegionId(2));

        let world = world.borrow();
        assert_eq!(world.spawned, vec![RegionId(1)]);
        assert_eq!(world.divisions.len(), 1);
        assert_eq!(world.divisions[0].soldiers, 12);
        assert_eq!(world.divisions[0].race, RaceId(4));
        assert_eq!(world.resupplied, vec![ArmyId(9)]);
        assert_eq!(world.notices[0].soldier_count, 12);
        assert_eq!(event.raids(), 1);
        assert!(event.last_report().is_some());
    }

    #[test]
    fn test_raid_needs_settlement() {
        let mut event = RaidEvent::new(seeded(), world(false, Some(RegionId(1)))).unwrap();
        assert_eq!(event.trigger_raid(), Err(RaidError::NoSettlement));
    }

    #[test]
    fn test_raid_needs_staging_region() {
        let world = world(true, None);
        let mut event = RaidEvent::new(seeded(), world.clone()).unwrap();
        assert_eq!(event.trigger_raid(), Err(RaidError::NoStagingRegion));
        // the failed raid is swallowed by the event hook
        event.on_event();
        assert!(world.borrow().notices.is_empty());
        assert_eq!(event.raids(), 0);
    }

    #[test]
    fn test_missing_market_item_spawns_nothing() {
        let world = world(true, Some(RegionId(1)));
        world.borrow_mut().market.retain(|item| item.key != "BOW");
        let mut event = RaidEvent::new(seeded(), world.clone()).unwrap();

        assert_eq!(
            event.trigger_raid(),
            Err(RaidError::Composer(ComposerError::ZeroCost {
                item: "ranged weapon"
            }))
        );
        assert_untouched(&world.borrow());
        assert_eq!(event.raids(), 0);
        assert!(event.last_report().is_none());
    }

    #[test]
    fn test_empty_census_spawns_nothing() {
        let world = world(true, Some(RegionId(1)));
        world.borrow_mut().census.clear();
        let mut event = RaidEvent::new(seeded(), world.clone()).unwrap();

        assert!(matches!(
            event.trigger_raid(),
            Err(RaidError::Composer(ComposerError::EmptyCensus))
        ));
        assert_untouched(&world.borrow());
    }

    #[test]
    fn test_missing_target_spawns_nothing() {
        let world = world(true, Some(RegionId(1)));
        world.borrow_mut().target = None;
        let mut event = RaidEvent::new(seeded(), world.clone()).unwrap();

        assert_eq!(
            event.trigger_raid(),
            Err(RaidError::NoTargetRegion(RegionId(1)))
        );
        assert_untouched(&world.borrow());
    }

    #[test]
    fn test_valuation_reads_attached_statistics() {
        let world = world(true, Some(RegionId(1)));
        let mut richer = World {
            market: market(),
            ..World::default()
        };
        richer.market.push(ResourceMetadata::new("GOLD", 1_000, 900, 10));
        let cache = Rc::new(RefCell::new(Statistics::capture(&richer)));
        let mut event = RaidEvent::new(seeded(), world.clone())
            .unwrap()
            .with_statistics(cache.clone());

        // 100 citizens at 500 plus 10 gold sold at 900
        let report = event.trigger_raid().unwrap();
        assert_eq!(report.valuation.wealth, 59_000);

        cache.borrow_mut().refresh(&*world.borrow());
        let report = event.trigger_raid().unwrap();
        assert_eq!(report.valuation.wealth, 50_000);
    }

    #[test]
    fn test_dispatcher_refreshes_raid_statistics() {
        struct Host(Rc<RefCell<World>>);

        impl RoomDirectory for Host {
            fn room_instances(&self, _room_type: &str) -> Vec<RoomInstance> {
                Vec::new()
            }
        }

        impl HostWorld for Host {
            fn economy(&self) -> &dyn EconomySource {
                self
            }
        }

        impl EconomySource for Host {
            fn population(&self) -> PopulationCounts {
                self.0.borrow().population()
            }

            fn resources(&self) -> Vec<ResourceMetadata> {
                self.0.borrow().resources()
            }

            fn riches(&self) -> i64 {
                self.0.borrow().riches()
            }
        }

        let world = world(true, Some(RegionId(1)));
        let cache = Rc::new(RefCell::new(Statistics::default()));
        let config = RaidConfig {
            chance_per_second: 1_000.0,
            ..seeded()
        };
        let event = Rc::new(RefCell::new(
            RaidEvent::new(config, world.clone())
                .unwrap()
                .with_statistics(cache.clone()),
        ));
        let global_events: Vec<Shared<dyn GlobalEvent>> = vec![event.clone()];
        let loaded = LoadedModules {
            global_events,
            ..LoadedModules::default()
        };
        let mut dispatcher = Dispatcher::seeded(loaded, 5).with_statistics(cache.clone());

        dispatcher.update(1.0, &Host(world.clone()));

        assert_eq!(cache.borrow().population.population(), 100);
        let event = event.borrow();
        assert_eq!(event.raids(), 1);
        assert_eq!(event.last_report().unwrap().valuation.wealth, 50_000);
        assert_eq!(world.borrow().spawned, vec![RegionId(1)]);
    }

    #[test]
    fn test_registered_event_reads_shared_statistics() {
        let world = world(true, Some(RegionId(1)));
        // the shared snapshot has no BOW although the host market does
        let mut stale = World {
            market: market(),
            ..World::default()
        };
        stale.market.retain(|item| item.key != "BOW");
        let cache = Rc::new(RefCell::new(Statistics::capture(&stale)));

        let mut registry = ClassRegistry::new();
        assert!(RaidEvent::register(
            &mut registry,
            seeded(),
            world.clone(),
            Some(cache.clone())
        ));

        let mut config = ModuleConfig::new();
        config.set("raid.chance_per_second", "0.5");
        let paths = ModulePaths::resolve(Path::new("mods/raiders"), "V63", "script/jar");
        let context = ModuleContext::new(
            ModuleDescriptor::new("raiders", Version::new(1, 0, 0), paths),
            config,
        );
        let Some(ClassDefinition::GlobalEvent(factory)) = registry.resolve(RAID_EVENT_CLASS)
        else {
            panic!("raid event not registered as a global event");
        };
        let event = factory(&context).unwrap().event().clone();
        assert!((event.borrow().chance_per_second() - 0.5).abs() < f64::EPSILON);

        event.borrow_mut().on_event();
        assert_untouched(&world.borrow());

        cache.borrow_mut().refresh(&*world.borrow());
        event.borrow_mut().on_event();
        assert_eq!(world.borrow().spawned, vec![RegionId(1)]);
    }

    #[test]
    fn test_default_chance_disables_raids() {
        let event = RaidEvent::new(seeded(), world(true, None)).unwrap();
        assert!(event.chance_per_second().abs() < f64::EPSILON);
    }

    #[test]
    fn test_overrides_from_mod_config() {
        let mut config = ModuleConfig::new();
        config.set("raid.chance_per_second", "0.001");
        config.set("raid.pawns_per_division", "25");
        config.set("raid.seed", "not a number");

        let raid = RaidConfig::default().with_overrides(&config);
        assert!((raid.chance_per_second - 0.001).abs() < f64::EPSILON);
        assert_eq!(raid.composer.pawns_per_division, 25);
        assert_eq!(raid.seed, None);
    }

    #[test]
    fn test_config_from_ron() {
        let config = RaidConfig::from_ron("(chance_per_second: 0.5, composer: (min_army_size: 5))")
            .unwrap();
        assert!((config.chance_per_second - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.composer.min_army_size, 5);
        assert_eq!(config.composer.pawns_per_division, 50);
        assert_eq!(config.valuation, ValuationConfig::default());
    }
}
