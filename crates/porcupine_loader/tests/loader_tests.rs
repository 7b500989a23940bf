//! Load passes over real mod folders.

use porcupine_core::prelude::*;
use porcupine_loader::{LoadError, LoaderConfig, ModuleCache, ModuleLoader, PropertiesStore};
use porcupine_test_utils::fixtures::{
    entries_with_prefix, event_log, fixture_registry, EventLog, BEACON_CLASS, RECORDER_CLASS,
    TICK_ONLY_CLASS,
};
use porcupine_test_utils::logs::capture_logs;
use porcupine_test_utils::mod_folder::{class_entry, ModsRoot};

fn write_classes(root: &ModsRoot, mod_name: &str, jar: &str, classes: &[&str]) {
    let entries: Vec<String> = classes.iter().map(|c| class_entry(c)).collect();
    let mut refs: Vec<&str> = vec!["META-INF/", "META-INF/MANIFEST.MF"];
    refs.extend(entries.iter().map(String::as_str));
    root.write_jar(mod_name, jar, &refs).unwrap();
}

fn two_mods() -> ModsRoot {
    let root = ModsRoot::new().unwrap();
    root.write_manifest("alpha", "alpha", "1.0.0", "Ana").unwrap();
    root.write_manifest("beta", "beta", "2.1", "Bo").unwrap();
    write_classes(&root, "alpha", "alpha.jar", &[RECORDER_CLASS, BEACON_CLASS]);
    write_classes(&root, "beta", "beta.jar", &[RECORDER_CLASS, TICK_ONLY_CLASS]);
    root.write_config("alpha", "alpha.properties", &[("beacon.chance", "1000")])
        .unwrap();
    root
}

fn loader(root: &ModsRoot, log: &EventLog) -> ModuleLoader {
    ModuleLoader::new(
        LoaderConfig::with_roots(vec![root.path().to_path_buf()]),
        fixture_registry(log),
    )
}

#[test]
fn test_load_shared_class_space() {
    let root = two_mods();
    let log = event_log();

    let loaded = loader(&root, &log).load().unwrap();

    let modules: Vec<_> = loaded
        .modules
        .iter()
        .map(|m| format!("{}:{}", m.name(), m.class_name()))
        .collect();
    assert_eq!(
        modules,
        vec![
            format!("alpha:{RECORDER_CLASS}"),
            format!("beta:{TICK_ONLY_CLASS}")
        ]
    );
    assert_eq!(loaded.global_events.len(), 1);
    assert_eq!(loaded.duplicates.len(), 1);
    assert_eq!(loaded.duplicates[0].first_archive, "alpha.jar");
    assert_eq!(loaded.duplicates[0].duplicate_archive, "beta.jar");
    assert_eq!(entries_with_prefix(&log, &format!("new:{RECORDER_CLASS}")).len(), 1);
    assert_eq!(loaded.reportable_failures().count(), 0);
}

#[test]
fn test_duplicate_class_warning_names_both_archives() {
    let root = two_mods();
    let log = event_log();

    let (loaded, logs) = capture_logs(|| loader(&root, &log).load().unwrap());

    assert_eq!(loaded.duplicates.len(), 1);
    let warnings = logs.warnings_containing(&["Duplicate class", RECORDER_CLASS]);
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("alpha.jar"));
    assert!(warnings[0].contains("beta.jar"));
}

#[test]
fn test_isolated_space_logs_no_duplicates() {
    let root = two_mods();
    let mut config = LoaderConfig::with_roots(vec![root.path().to_path_buf()]);
    config.shared_class_space = false;

    let (_, logs) = capture_logs(|| {
        ModuleLoader::new(config, fixture_registry(&event_log()))
            .load()
            .unwrap()
    });

    assert!(logs.warnings_containing(&["Duplicate class"]).is_empty());
}

#[test]
fn test_load_isolated_class_space() {
    let root = two_mods();
    let log = event_log();
    let mut config = LoaderConfig::with_roots(vec![root.path().to_path_buf()]);
    config.shared_class_space = false;

    let loaded = ModuleLoader::new(config, fixture_registry(&log)).load().unwrap();

    assert!(loaded.duplicates.is_empty());
    assert_eq!(loaded.modules_of("beta").count(), 2);
}

#[test]
fn test_descriptor_and_config_reach_modules() {
    let root = two_mods();
    let log = event_log();

    let loaded = loader(&root, &log).load().unwrap();

    let recorder = &loaded.modules[0];
    assert_eq!(recorder.version().to_string(), "1.0.0");
    assert_eq!(recorder.descriptor().author(), "Ana");
    assert_eq!(recorder.config().borrow().get("beacon.chance"), Some("1000"));
    assert_eq!(loaded.global_events[0].borrow().chance_per_second(), 1000.0);

    let tick_only = &loaded.modules[1];
    assert_eq!(tick_only.version().to_string(), "2.1.0");
    assert!(tick_only.config().borrow().is_empty());
}

#[test]
fn test_no_archives_is_not_an_error() {
    let root = ModsRoot::new().unwrap();
    root.write_manifest("empty", "empty", "1", "nobody").unwrap();
    root.scripts_dir("empty").unwrap();

    let (loaded, logs) = capture_logs(|| loader(&root, &event_log()).load().unwrap());

    assert!(loaded.is_empty());
    assert!(loaded.failures.is_empty());
    let warnings = logs.warnings_containing(&["No .jar archives found for mod empty"]);
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert_eq!(logs.warnings_containing(&["No script archives found"]).len(), 1);
}

#[test]
fn test_missing_config_is_warned_per_mod() {
    let root = two_mods();

    let (_, logs) = capture_logs(|| loader(&root, &event_log()).load().unwrap());

    // alpha ships alpha.properties, beta ships nothing
    assert_eq!(logs.warnings_containing(&["No config found for mod beta"]).len(), 1);
    assert!(logs.warnings_containing(&["No config found for mod alpha"]).is_empty());
}

#[test]
fn test_no_mods_root_is_not_an_error() {
    let root = ModsRoot::new().unwrap();
    let missing = root.path().join("missing");
    let config = LoaderConfig::with_roots(vec![missing.clone()]);
    let (loaded, logs) = capture_logs(|| {
        ModuleLoader::new(config, fixture_registry(&event_log()))
            .load()
            .unwrap()
    });
    assert!(loaded.is_empty());
    let root_warning = format!("Mods root {} does not exist", missing.display());
    assert_eq!(logs.warnings_containing(&[root_warning.as_str()]).len(), 1);
}

#[test]
fn test_corrupt_archive_aborts_pass() {
    let root = two_mods();
    root.write_corrupt_jar("beta", "zzz.jar").unwrap();
    let log = event_log();
    let loader = loader(&root, &log);

    assert!(matches!(loader.load(), Err(LoadError::ArchiveFormat { .. })));
    assert!(loader.load_or_empty().is_empty());
}

#[test]
fn test_cache_loads_once() {
    let root = two_mods();
    let log = event_log();
    let loader = loader(&root, &log);
    let cache = ModuleCache::new();
    assert!(!cache.is_loaded());

    let first = cache.get_or_load(&loader).modules.len();
    let second = cache.get_or_load(&loader).modules.len();

    assert_eq!(first, second);
    assert!(cache.is_loaded());
    assert_eq!(entries_with_prefix(&log, &format!("new:{RECORDER_CLASS}")).len(), 1);
}

#[test]
fn test_cache_keeps_failed_pass_empty() {
    let root = two_mods();
    root.write_corrupt_jar("alpha", "broken.jar").unwrap();
    let log = event_log();
    let loader = loader(&root, &log);
    let cache = ModuleCache::new();

    assert!(cache.get_or_load(&loader).is_empty());

    std::fs::remove_file(root.scripts_dir("alpha").unwrap().join("broken.jar")).unwrap();
    assert!(cache.get_or_load(&loader).is_empty());
    assert!(entries_with_prefix(&log, "new:").is_empty());
}

#[test]
fn test_save_writes_config_back() {
    let root = two_mods();
    let log = event_log();
    let loaded = loader(&root, &log).load().unwrap();
    loaded.modules[0]
        .config()
        .borrow_mut()
        .set("beacon.chance", "0.5");

    let mut dispatcher = Dispatcher::seeded(loaded, 1);
    let mut buffer = SaveBuffer::new();
    let store = PropertiesStore::default();
    assert_eq!(dispatcher.save(&mut buffer, &store), 0);

    let reloaded = loader(&root, &event_log()).load().unwrap();
    assert_eq!(
        reloaded.modules[0].config().borrow().get("beacon.chance"),
        Some("0.5")
    );
}
