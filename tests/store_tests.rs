//! Storage engine integration tests: upserts, cascades, sync metadata.

mod support;

use cellar::core::store::Store;
use support::{init_project, vault};

fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

#[test]
fn test_upsert_creates_then_updates() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();
    let env = s.create_environment(&project.id, "development").unwrap();

    let first = s.upsert_secret(&env.id, "KEY", b"cipher-one", None).unwrap();
    assert!(first.created);

    let second = s
        .upsert_secret(&env.id, "KEY", b"cipher-two", Some("desc"))
        .unwrap();
    assert!(!second.created);
    assert_eq!(first.secret.id, second.secret.id);
    assert_eq!(second.secret.encrypted_value, b"cipher-two");
    assert_eq!(second.secret.description.as_deref(), Some("desc"));
}

#[test]
fn test_project_delete_cascades_all_tables() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();
    let env = s.create_environment(&project.id, "development").unwrap();
    let write = s.upsert_secret(&env.id, "KEY", b"cipher", None).unwrap();
    s.append_history(&write.secret.id, &env.id, "KEY", b"old", None, 1)
        .unwrap();
    s.record_sync(&project.id, 1, "checksum").unwrap();

    s.delete_project(&project.id).unwrap();

    assert!(s.find_environment(&project.id, "development").unwrap().is_none());
    assert!(s.find_secret(&env.id, "KEY").unwrap().is_none());
    assert!(s.sync_state(&project.id).unwrap().is_none());
    assert_eq!(s.max_history_version(&write.secret.id).unwrap(), 0);
}

#[test]
fn test_environment_for_missing_project_is_not_a_duplicate() {
    use cellar::error::{Error, StoreError};

    let s = store();
    let err = s.create_environment("no-such-project", "development").unwrap_err();
    assert!(
        matches!(err, Error::Store(StoreError::Sql(_))),
        "FK violation should surface as a SQL error, got {err:?}"
    );
}

#[test]
fn test_find_project_by_name() {
    let s = store();
    let created = s.create_project("lookup-me", None, "tester").unwrap();

    let found = s.find_project_by_name("lookup-me").unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(s.find_project_by_name("missing").unwrap().is_none());
}

#[test]
fn test_sync_state_upsert() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();

    s.record_sync(&project.id, 1, "aaa").unwrap();
    s.record_sync(&project.id, 2, "bbb").unwrap();

    let state = s.sync_state(&project.id).unwrap().unwrap();
    assert_eq!(state.version, 2);
    assert_eq!(state.checksum.as_deref(), Some("bbb"));
    assert!(state.last_sync_at.is_some());
}

#[test]
fn test_history_versions_are_monotonic() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();
    let env = s.create_environment(&project.id, "development").unwrap();
    let write = s.upsert_secret(&env.id, "KEY", b"v", None).unwrap();

    assert_eq!(s.max_history_version(&write.secret.id).unwrap(), 0);
    s.append_history(&write.secret.id, &env.id, "KEY", b"a", None, 1)
        .unwrap();
    s.append_history(&write.secret.id, &env.id, "KEY", b"b", None, 2)
        .unwrap();
    assert_eq!(s.max_history_version(&write.secret.id).unwrap(), 2);

    let versions: Vec<i64> = s
        .list_history(&write.secret.id, 10)
        .unwrap()
        .into_iter()
        .map(|h| h.version)
        .collect();
    assert_eq!(versions, [2, 1]);
}

#[test]
fn test_history_limit() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();
    let env = s.create_environment(&project.id, "development").unwrap();
    let write = s.upsert_secret(&env.id, "KEY", b"v", None).unwrap();

    for version in 1..=5 {
        s.append_history(&write.secret.id, &env.id, "KEY", b"x", None, version)
            .unwrap();
    }

    let entries = s.list_history(&write.secret.id, 2).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version, 5);
}

#[test]
fn test_set_sync_enabled() {
    let s = store();
    let project = s.create_project("app", None, "tester").unwrap();
    assert!(!project.sync_enabled);

    s.set_sync_enabled(&project.id, true).unwrap();
    assert!(s.get_project(&project.id).unwrap().sync_enabled);
}

#[test]
fn test_vault_and_store_share_connection_state() {
    // The vault's audit writes are visible through the same store handle.
    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "K", "v", None).unwrap();

    let entries = v.store().list_audit(&pid, 10).unwrap();
    assert!(!entries.is_empty());
}
