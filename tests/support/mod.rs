//! Shared helpers for integration tests.
//!
//! All tests run against an in-memory store and a fixed master key so no
//! OS keyring, filesystem database, or network is involved.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use cellar::core::crypto::CryptoService;
use cellar::core::store::Store;
use cellar::core::vault::Vault;

pub const TEST_KEY: [u8; 32] = [7u8; 32];

/// Vault over an in-memory database with the shared test key.
pub fn vault() -> Vault {
    vault_with_key(&TEST_KEY)
}

/// Vault over an in-memory database with a caller-chosen key.
pub fn vault_with_key(key: &[u8; 32]) -> Vault {
    let store = Store::open_in_memory().expect("in-memory store");
    Vault::new(store, CryptoService::with_key(key))
}

/// Create a project with the default three environments; returns its id.
pub fn init_project(vault: &Vault, name: &str) -> String {
    vault
        .init_project(name, None, "tester", &["development", "staging", "production"])
        .expect("init project")
        .id
}
