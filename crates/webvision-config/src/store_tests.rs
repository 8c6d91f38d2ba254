use super::*;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load_in(dir.path());

    assert_eq!(store.snapshot(), UserConfig::default());
    assert!(store.api_key().is_none());
    assert_eq!(store.theme(), "default");
    assert!(store.is_first_run());
}

#[test]
fn test_load_creates_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("home").join(".webvision");
    let store = ConfigStore::load_in(&nested);

    assert!(nested.is_dir());
    assert_eq!(store.path(), nested.join("config.json"));
}

#[test]
fn test_round_trip() {
    let dir = TempDir::new().unwrap();
    {
        let store = ConfigStore::load_in(dir.path());
        store.set_api_key("X");
        store.set_theme("ocean");
        store.set_first_run(false);
    }

    let reloaded = ConfigStore::load_in(dir.path());
    assert_eq!(reloaded.api_key().as_deref(), Some("X"));
    assert_eq!(reloaded.theme(), "ocean");
    assert!(!reloaded.is_first_run());
}

#[test]
fn test_every_setter_persists() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load_in(dir.path());

    store.set_theme("dark");
    let on_disk: UserConfig =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk.theme, "dark");
    assert!(on_disk.first_time);
}

#[test]
fn test_corrupt_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let store = ConfigStore::load_in(dir.path());
    assert_eq!(store.snapshot(), UserConfig::default());
}

#[test]
fn test_partial_file_fills_missing_keys() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"theme": "forest"}"#).unwrap();

    let store = ConfigStore::load_in(dir.path());
    assert_eq!(store.theme(), "forest");
    assert!(store.api_key().is_none());
    assert!(store.is_first_run());
}

#[test]
fn test_on_disk_shape() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load_in(dir.path());
    store.set_first_run(true);

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["apiKey"].is_null());
    assert_eq!(json["theme"], "default");
    assert_eq!(json["firstTime"], true);
    // Pretty-printed with two-space indentation.
    assert!(raw.contains("\n  \"apiKey\""));
}

#[test]
fn test_write_failure_keeps_memory_state() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every write fail.
    let blocked = dir.path().join("config.json");
    std::fs::create_dir(&blocked).unwrap();

    let store = ConfigStore::load_from(&blocked);
    store.set_api_key("sk-in-memory");
    assert_eq!(store.api_key().as_deref(), Some("sk-in-memory"));
}

#[test]
fn test_fresh_install_setup_flow() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load_in(dir.path());
    assert!(store.is_first_run());

    store.set_api_key("sk-0123456789");
    store.set_theme("forest");
    store.set_first_run(false);

    let reloaded = ConfigStore::load_in(dir.path());
    assert!(!reloaded.is_first_run());
    assert_eq!(reloaded.theme(), "forest");
}
