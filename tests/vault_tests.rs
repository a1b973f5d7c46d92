//! Vault engine integration tests: secrets, environments, history, audit.

mod support;

use cellar::error::{Error, StoreError};
use support::{init_project, vault};

#[test]
fn test_set_get_roundtrip() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "DATABASE_URL", "postgres://localhost/dev", None)
        .unwrap();
    let value = v.get(&pid, "development", "DATABASE_URL").unwrap();
    assert_eq!(value.as_str(), "postgres://localhost/dev");
}

#[test]
fn test_get_missing_secret() {
    let v = vault();
    let pid = init_project(&v, "app");

    let err = v.get(&pid, "development", "NOPE").unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::SecretNotFound(_))
    ));
}

#[test]
fn test_get_missing_environment() {
    let v = vault();
    let pid = init_project(&v, "app");

    let err = v.get(&pid, "qa", "KEY").unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::EnvironmentNotFound(_))
    ));
}

#[test]
fn test_set_rejects_invalid_keys() {
    let v = vault();
    let pid = init_project(&v, "app");

    for bad in ["", "2FAST", "WITH-DASH", "lower space"] {
        let err = v.set(&pid, "development", bad, "x", None).unwrap_err();
        assert!(
            matches!(err, Error::Store(StoreError::InvalidKey { .. })),
            "expected InvalidKey for {bad:?}"
        );
    }
}

#[test]
fn test_overwrite_keeps_secret_id_and_records_history() {
    let v = vault();
    let pid = init_project(&v, "app");

    let first = v.set(&pid, "development", "TOKEN", "one", None).unwrap();
    let second = v.set(&pid, "development", "TOKEN", "two", None).unwrap();
    assert_eq!(first.id, second.id);

    let history = v.history(&pid, "development", "TOKEN", 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, 1);
    assert_eq!(history[0].value.as_str(), "one");

    v.set(&pid, "development", "TOKEN", "three", None).unwrap();
    let history = v.history(&pid, "development", "TOKEN", 10).unwrap();
    assert_eq!(history.len(), 2);
    // Newest first.
    assert_eq!(history[0].version, 2);
    assert_eq!(history[0].value.as_str(), "two");
}

#[test]
fn test_first_write_has_no_history() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "FRESH", "v", None).unwrap();
    assert!(v.history(&pid, "development", "FRESH", 10).unwrap().is_empty());
}

#[test]
fn test_rollback_to_previous_version() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "KEY", "old", None).unwrap();
    v.set(&pid, "development", "KEY", "new", None).unwrap();

    v.restore_version(&pid, "development", "KEY", 1).unwrap();
    assert_eq!(v.get(&pid, "development", "KEY").unwrap().as_str(), "old");

    // The rollback itself snapshots "new" as the next version.
    let history = v.history(&pid, "development", "KEY", 10).unwrap();
    assert_eq!(history[0].value.as_str(), "new");
}

#[test]
fn test_rollback_unknown_version() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "KEY", "v", None).unwrap();
    assert!(v.restore_version(&pid, "development", "KEY", 9).is_err());
}

#[test]
fn test_unset_removes_secret() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "GONE", "x", None).unwrap();
    v.unset(&pid, "development", "GONE").unwrap();
    assert!(v.get(&pid, "development", "GONE").is_err());
}

#[test]
fn test_list_is_sorted_by_key() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "ZEBRA", "z", None).unwrap();
    v.set(&pid, "development", "ALPHA", "a", None).unwrap();
    v.set(&pid, "development", "MID", "m", None).unwrap();

    let keys: Vec<String> = v
        .list(&pid, "development")
        .unwrap()
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(keys, ["ALPHA", "MID", "ZEBRA"]);
}

#[test]
fn test_environments_are_isolated() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "KEY", "dev", None).unwrap();
    v.set(&pid, "staging", "KEY", "stage", None).unwrap();

    assert_eq!(v.get(&pid, "development", "KEY").unwrap().as_str(), "dev");
    assert_eq!(v.get(&pid, "staging", "KEY").unwrap().as_str(), "stage");
    assert!(v.get(&pid, "production", "KEY").is_err());
}

#[test]
fn test_copy_environment() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "A", "1", None).unwrap();
    v.set(&pid, "development", "B", "2", None).unwrap();
    v.set(&pid, "staging", "B", "stale", None).unwrap();

    let copied = v.copy_environment(&pid, "development", "staging").unwrap();
    assert_eq!(copied, 2);
    assert_eq!(v.get(&pid, "staging", "A").unwrap().as_str(), "1");
    assert_eq!(v.get(&pid, "staging", "B").unwrap().as_str(), "2");
}

#[test]
fn test_duplicate_environment_rejected() {
    let v = vault();
    let pid = init_project(&v, "app");

    let err = v.create_environment(&pid, "development").unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::EnvironmentExists(_))
    ));
}

#[test]
fn test_delete_environment_cascades() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "staging", "DOOMED", "x", None).unwrap();
    v.delete_environment(&pid, "staging").unwrap();

    assert!(v.get(&pid, "staging", "DOOMED").is_err());
    let names: Vec<String> = v
        .environments(&pid)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(!names.contains(&"staging".to_string()));
}

#[test]
fn test_import_env_file() {
    let v = vault();
    let pid = init_project(&v, "app");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        "# comment\nDATABASE_URL=postgres://localhost\nAPI_KEY=\"quoted value\"\n\nbad-key=skipme\n",
    )
    .unwrap();

    let outcome = v.import_env_file(&pid, "development", &path).unwrap();
    assert_eq!(outcome.imported, ["DATABASE_URL", "API_KEY"]);
    assert_eq!(outcome.skipped, ["bad-key"]);

    assert_eq!(
        v.get(&pid, "development", "API_KEY").unwrap().as_str(),
        "quoted value"
    );
}

#[test]
fn test_audit_records_operations() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "KEY", "one", None).unwrap();
    v.set(&pid, "development", "KEY", "two", None).unwrap();
    v.unset(&pid, "development", "KEY").unwrap();

    let actions: Vec<String> = v
        .audit_log(&pid, 50)
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();

    assert!(actions.contains(&"project_created".to_string()));
    assert!(actions.contains(&"secret_created".to_string()));
    assert!(actions.contains(&"secret_updated".to_string()));
    assert!(actions.contains(&"secret_deleted".to_string()));
}

#[test]
fn test_reveal_decrypts_everything() {
    let v = vault();
    let pid = init_project(&v, "app");

    v.set(&pid, "development", "A", "1", Some("first")).unwrap();
    v.set(&pid, "development", "B", "2", None).unwrap();

    let revealed = v.reveal(&pid, "development").unwrap();
    assert_eq!(revealed.len(), 2);
    assert_eq!(revealed[0].key, "A");
    assert_eq!(revealed[0].value.as_str(), "1");
    assert_eq!(revealed[0].description.as_deref(), Some("first"));
}

#[test]
fn test_wrong_key_cannot_decrypt() {
    use cellar::core::crypto::CryptoService;
    use cellar::core::store::Store;
    use cellar::core::vault::Vault;

    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "SECRET", "value", None).unwrap();

    let row = &v.list(&pid, "development").unwrap()[0];
    let other = Vault::new(
        Store::open_in_memory().unwrap(),
        CryptoService::with_key(&[9u8; 32]),
    );
    assert!(other.crypto().decrypt(&row.encrypted_value).is_err());
}
