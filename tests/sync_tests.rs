//! Sync engine tests against an in-memory remote.

mod support;

use std::cell::RefCell;
use std::rc::Rc;

use cellar::core::api::{PullBlobResponse, PushBlobResponse, Remote};
use cellar::core::domain::SyncDirection;
use cellar::core::sync::SyncEngine;
use cellar::error::{Error, Result, SyncError};
use chrono::Utc;
use support::{init_project, vault, vault_with_key, TEST_KEY};

#[derive(Debug, Clone)]
struct StoredBlob {
    data: String,
    checksum: String,
    version: i64,
}

/// In-memory stand-in for the sync server. Cloning shares the blob slot
/// so a test can hold a handle while the engine owns another.
#[derive(Clone, Default)]
struct MemoryRemote {
    blob: Rc<RefCell<Option<StoredBlob>>>,
}

impl Remote for MemoryRemote {
    fn push_blob(
        &self,
        _project_id: &str,
        encrypted_data: &str,
        checksum: &str,
    ) -> Result<PushBlobResponse> {
        let version = self.blob.borrow().as_ref().map_or(0, |b| b.version) + 1;
        *self.blob.borrow_mut() = Some(StoredBlob {
            data: encrypted_data.to_string(),
            checksum: checksum.to_string(),
            version,
        });
        Ok(PushBlobResponse {
            version,
            uploaded_at: Utc::now(),
        })
    }

    fn pull_blob(&self, _project_id: &str, since_version: Option<i64>) -> Result<PullBlobResponse> {
        match self.blob.borrow().as_ref() {
            Some(blob) if since_version.map_or(true, |since| blob.version > since) => {
                Ok(PullBlobResponse {
                    has_update: true,
                    version: Some(blob.version),
                    encrypted_data: Some(blob.data.clone()),
                    checksum: Some(blob.checksum.clone()),
                    uploaded_at: Some(Utc::now()),
                })
            }
            _ => Ok(PullBlobResponse {
                has_update: false,
                version: None,
                encrypted_data: None,
                checksum: None,
                uploaded_at: None,
            }),
        }
    }

    fn validate_token(&self) -> Result<String> {
        Ok("tester".to_string())
    }
}

#[test]
fn test_push_then_pull_transfers_secrets() {
    let remote = MemoryRemote::default();

    let source = vault();
    let pid = init_project(&source, "app");
    source.set(&pid, "development", "A", "1", None).unwrap();
    source.set(&pid, "production", "B", "2", None).unwrap();

    let engine = SyncEngine::new(remote.clone());
    let pushed = engine.push(&source, &pid).unwrap();
    assert_eq!(pushed.version, Some(1));
    assert_eq!(pushed.secrets, 2);
    assert_eq!(pushed.environments, 3);

    // Second device, same master key, empty vault with only the project.
    let target = vault_with_key(&TEST_KEY);
    let target_pid = target
        .init_project("app", None, "tester", &["development"])
        .unwrap()
        .id;

    let pulled = engine.pull(&target, &target_pid).unwrap();
    assert_eq!(pulled.version, Some(1));
    assert_eq!(pulled.secrets_imported, 2);
    // "production" and "staging" were created, "development" existed.
    assert_eq!(pulled.environments_created, 2);

    assert_eq!(
        target.get(&target_pid, "development", "A").unwrap().as_str(),
        "1"
    );
    assert_eq!(
        target.get(&target_pid, "production", "B").unwrap().as_str(),
        "2"
    );
}

#[test]
fn test_pull_is_additive() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote.clone());

    let source = vault();
    let pid = init_project(&source, "app");
    source.set(&pid, "development", "SHARED", "remote", None).unwrap();
    engine.push(&source, &pid).unwrap();

    let target = vault_with_key(&TEST_KEY);
    let target_pid = init_project(&target, "app");
    target
        .set(&target_pid, "development", "LOCAL_ONLY", "keep", None)
        .unwrap();

    engine.pull(&target, &target_pid).unwrap();

    // Remote data lands, local-only data survives.
    assert_eq!(
        target
            .get(&target_pid, "development", "SHARED")
            .unwrap()
            .as_str(),
        "remote"
    );
    assert_eq!(
        target
            .get(&target_pid, "development", "LOCAL_ONLY")
            .unwrap()
            .as_str(),
        "keep"
    );
}

#[test]
fn test_pull_without_update_is_a_noop() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote);

    let v = vault();
    let pid = init_project(&v, "app");

    let outcome = engine.pull(&v, &pid).unwrap();
    assert_eq!(outcome.version, None);
    assert_eq!(outcome.secrets_imported, 0);
}

#[test]
fn test_pull_skips_already_synced_version() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote.clone());

    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "K", "v", None).unwrap();

    engine.push(&v, &pid).unwrap();
    // The push recorded version 1 locally, so the remote has nothing newer.
    let outcome = engine.pull(&v, &pid).unwrap();
    assert_eq!(outcome.version, None);
}

#[test]
fn test_pull_rejects_corrupted_blob() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote.clone());

    let source = vault();
    let pid = init_project(&source, "app");
    source.set(&pid, "development", "K", "v", None).unwrap();
    engine.push(&source, &pid).unwrap();

    // Flip a byte of the stored blob; the checksum no longer matches.
    {
        let mut slot = remote.blob.borrow_mut();
        let blob = slot.as_mut().unwrap();
        blob.data.replace_range(0..1, "!");
    }

    let target = vault_with_key(&TEST_KEY);
    let target_pid = init_project(&target, "app");
    let err = engine.pull(&target, &target_pid).unwrap_err();
    assert!(matches!(err, Error::Sync(SyncError::ChecksumMismatch)));

    // Nothing was imported.
    assert!(target.list(&target_pid, "development").unwrap().is_empty());
}

#[test]
fn test_bidirectional_sync_pulls_before_push() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote.clone());

    let first = vault();
    let first_pid = init_project(&first, "app");
    first.set(&first_pid, "development", "FROM_A", "a", None).unwrap();
    engine.push(&first, &first_pid).unwrap();

    let second = vault_with_key(&TEST_KEY);
    let second_pid = init_project(&second, "app");
    second
        .set(&second_pid, "development", "FROM_B", "b", None)
        .unwrap();

    let (pulled, pushed) = engine
        .sync(&second, &second_pid, SyncDirection::Both)
        .unwrap();
    assert_eq!(pulled.unwrap().secrets_imported, 1);
    // The push uploaded the merged state.
    assert_eq!(pushed.unwrap().secrets, 2);

    // First device pulls the merge back.
    let outcome = engine.pull(&first, &first_pid).unwrap();
    assert_eq!(outcome.secrets_imported, 2);
    assert_eq!(
        first.get(&first_pid, "development", "FROM_B").unwrap().as_str(),
        "b"
    );
}

#[test]
fn test_sync_state_recorded() {
    let remote = MemoryRemote::default();
    let engine = SyncEngine::new(remote);

    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "K", "v", None).unwrap();
    engine.push(&v, &pid).unwrap();

    let state = v.store().sync_state(&pid).unwrap().unwrap();
    assert_eq!(state.version, 1);
    assert!(state.checksum.is_some());
    assert!(v.store().get_project(&pid).unwrap().sync_enabled);
}
