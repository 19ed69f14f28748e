use std::sync::Arc;

use hearth_core::clock::ManualClock;
use hearth_core::keys::{cookie, durable};
use hearth_core::store::StoreBackend;
use hearth_infrastructure::snapshot_codec;
use hearth_infrastructure::{FileCookieJar, FileDurableStore, HearthPaths};
use tempfile::TempDir;

#[test]
fn test_stores_share_one_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let paths = HearthPaths::new(Some(temp_dir.path().to_path_buf()));
    let clock = ManualClock::default();

    let durable_store = FileDurableStore::new(paths.durable_store_file().unwrap());
    let jar = FileCookieJar::new(paths.cookie_jar_file().unwrap(), Arc::new(clock.clone()));

    durable_store
        .write(durable::USER, r#"{"id":"admin","displayName":"Admin User","role":"admin"}"#, None)
        .expect("Should write durable record");
    jar.write(cookie::LOGGED_IN, cookie::LOGGED_IN_VALUE, Some(7))
        .expect("Should write marker");

    assert!(temp_dir.path().join("durable.json").exists());
    assert!(temp_dir.path().join("cookies.json").exists());

    // A second process sees the same state.
    let reopened_jar = FileCookieJar::new(paths.cookie_jar_file().unwrap(), Arc::new(clock.clone()));
    assert_eq!(
        reopened_jar.read(cookie::LOGGED_IN).unwrap().as_deref(),
        Some("true")
    );

    clock.advance_days(7);
    assert_eq!(reopened_jar.read(cookie::LOGGED_IN).unwrap(), None);
    assert!(
        FileDurableStore::new(paths.durable_store_file().unwrap())
            .read(durable::USER)
            .unwrap()
            .is_some(),
        "Durable entries never expire"
    );
}

#[test]
fn test_clear_removes_files() {
    let temp_dir = TempDir::new().unwrap();
    let durable_path = temp_dir.path().join("durable.json");
    let store = FileDurableStore::new(durable_path.clone());

    store.write(durable::THEME_MODE, "light", None).unwrap();
    store.clear().unwrap();

    assert!(!durable_path.exists());
    assert!(store.entries().unwrap().is_empty());
    store.clear().expect("Clearing twice is fine");
}

#[test]
fn test_unwritable_location_is_storage_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let store = FileDurableStore::new(blocker.join("durable.json"));
    let err = store.write(durable::LANGUAGE, "fr", None).unwrap_err();
    assert!(err.is_storage_unavailable());
}

#[test]
fn test_hand_edited_legacy_snapshot_imports() {
    let legacy = r#"{
        "version": "1.0.0",
        "user": "{\"id\":\"u-1\",\"displayName\":\"a@b.c\",\"email\":\"a@b.c\"}",
        "theme": "LIGHT",
        "language": "es-MX",
        "preferences": "{\"dashboard\":\"compact\"}",
        "scrollPosition": 80.9
    }"#;

    let snapshot = snapshot_codec::decode(legacy).expect("Legacy snapshot should import");
    let record = snapshot.session.expect("Embedded record should decode");
    assert_eq!(record.email.as_deref(), Some("a@b.c"));
    assert_eq!(snapshot.theme.to_string(), "light");
    assert_eq!(snapshot.language.to_string(), "es");
    // A preference map given as a string is not an object and is dropped.
    assert!(snapshot.preferences.is_empty());
    assert_eq!(snapshot.scroll_position, 80);
}
