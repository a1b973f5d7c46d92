//! Core library components.
//!
//! This module contains the reusable business logic for secret management,
//! encryption, storage, and synchronization.

pub mod api;
pub mod backup;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod domain;
pub mod envfile;
pub mod keystore;
pub mod secure;
pub mod store;
pub mod sync;
pub mod vault;
