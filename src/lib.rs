//! Cellar - a local-first, zero-knowledge secret vault.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── context       # Project marker + open vault per invocation
//! │   ├── output        # Terminal output helpers
//! │   └── ...           # One handler module per subcommand
//! └── core/             # Core library components
//!     ├── secure        # Wipeable, lock-pinned byte buffers
//!     ├── keystore      # OS keyring custody of the master key
//!     ├── crypto        # AES-256-GCM service around the master key
//!     ├── store/        # Embedded SQLite storage engine
//!     ├── domain/       # Entity types
//!     ├── vault         # Vault engine (crypto + store + history/audit)
//!     ├── envfile       # .env parsing and rendering
//!     ├── backup        # Project backup files
//!     ├── sync          # Zero-knowledge push/pull protocol
//!     └── api           # Remote blob endpoint client
//! ```
//!
//! # Features
//!
//! - Per-project, per-environment key/value secrets
//! - AES-256-GCM encryption under a machine-bound master key
//! - Revision history and an append-only audit trail
//! - Backups and zero-knowledge sync of encrypted blobs
//! - Child processes run with secrets injected as environment variables

pub mod cli;
pub mod core;
pub mod error;
