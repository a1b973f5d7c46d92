//! Cellar - a local-first, zero-knowledge secret vault.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cellar::cli::output;
use cellar::cli::{execute, Cli};
use cellar::error::{ConfigError, CryptoError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("CELLAR_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cellar=debug")
        } else {
            EnvFilter::new("cellar=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotInitialized) => Some("run: cellar init"),
            Error::Config(ConfigError::AlreadyInitialized) => Some("this directory already has a .cellar.toml"),
            Error::Crypto(CryptoError::DecryptionFailed) => {
                Some("the master key in the keyring may not match this database")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
