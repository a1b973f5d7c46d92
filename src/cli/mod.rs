//! Command-line interface.

pub mod audit;
pub mod backup;
pub mod completions;
pub mod context;
pub mod env;
pub mod init;
pub mod output;
pub mod projects;
pub mod reset_key;
pub mod run;
pub mod secrets;
pub mod sync;

use clap::{Parser, Subcommand};

/// Cellar - a local-first, zero-knowledge secret vault.
#[derive(Parser)]
#[command(
    name = "cellar",
    about = "A local-first, zero-knowledge secret vault for developers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize a project in the current directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
        /// Project description
        #[arg(short, long)]
        description: Option<String>,
        /// Comma-separated environment names
        #[arg(long, default_value = "development,staging,production")]
        environments: String,
    },

    /// Set a secret value
    Set {
        /// Secret key (e.g., DATABASE_URL)
        key: String,
        /// Secret value (prompted for when omitted)
        value: Option<String>,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Get a secret value
    Get {
        /// Secret key
        key: String,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
    },

    /// Remove a secret
    Unset {
        /// Secret key
        key: String,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
    },

    /// List secrets in an environment
    List {
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
        /// Show decrypted values
        #[arg(long)]
        show: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage environments
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Import secrets from a .env file
    Import {
        /// Path to .env file
        path: String,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
    },

    /// Export secrets as .env format
    Export {
        /// Source environment
        #[arg(short, long, default_value = "development")]
        env: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a command with decrypted secrets as environment variables
    Run {
        /// Source environment
        #[arg(short, long, default_value = "development")]
        env: String,
        /// Command and arguments to execute
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the version history of a secret
    History {
        /// Secret key
        key: String,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
        /// Maximum entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Restore a secret to a previous version
    Rollback {
        /// Secret key
        key: String,
        /// History version to restore
        version: i64,
        /// Target environment
        #[arg(short, long, default_value = "development")]
        env: String,
    },

    /// Show the project audit log
    Audit {
        /// Maximum entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Sync encrypted secrets with the remote
    Sync {
        /// Push only
        #[arg(long, conflicts_with = "pull")]
        push: bool,
        /// Pull only
        #[arg(long, conflicts_with = "push")]
        pull: bool,
        /// Sync server URL
        #[arg(long, env = "CELLAR_SYNC_URL")]
        server: String,
        /// API token
        #[arg(long, env = "CELLAR_SYNC_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Write an encrypted backup of the project
    Backup {
        /// Output path (defaults to cellar-backup-<project>-<timestamp>.enc)
        path: Option<String>,
    },

    /// Restore a project from a backup file
    Restore {
        /// Backup file path
        path: String,
        /// Merge into existing secrets instead of replacing environments
        #[arg(short, long)]
        merge: bool,
        /// Allow restoring a backup from a different project
        #[arg(long)]
        force: bool,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Delete the master key from the OS keyring
    ResetKey {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Environment subcommands.
#[derive(Subcommand)]
pub enum EnvAction {
    /// List environments
    List,

    /// Create an environment
    Create {
        /// Environment name
        name: String,
    },

    /// Delete an environment and all its secrets
    Delete {
        /// Environment name
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Copy all secrets from one environment to another
    Copy {
        /// Source environment
        from: String,
        /// Destination environment
        to: String,
    },
}

/// Project subcommands.
#[derive(Subcommand)]
pub enum ProjectAction {
    /// List all projects on this machine
    List,

    /// Delete a project and everything it owns
    Delete {
        /// Project name
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init {
            name,
            description,
            environments,
        } => init::execute(name, description, &environments),
        Set {
            key,
            value,
            env,
            description,
        } => secrets::set(&key, value, &env, description.as_deref()),
        Get { key, env } => secrets::get(&key, &env),
        Unset { key, env } => secrets::unset(&key, &env),
        List { env, show, json } => secrets::list(&env, show, json),
        Env { action } => match action {
            EnvAction::List => env::list(),
            EnvAction::Create { name } => env::create(&name),
            EnvAction::Delete { name, force } => env::delete(&name, force),
            EnvAction::Copy { from, to } => env::copy(&from, &to),
        },
        Import { path, env } => env::import(&path, &env),
        Export { env, output } => env::export(&env, output.as_deref()),
        Run { env, command } => run::execute(&env, &command),
        History { key, env, limit } => secrets::history(&key, &env, limit),
        Rollback { key, version, env } => secrets::rollback(&key, version, &env),
        Audit { limit } => audit::execute(limit),
        Sync {
            push,
            pull,
            server,
            token,
        } => sync::execute(push, pull, &server, &token),
        Backup { path } => backup::create(path.as_deref()),
        Restore { path, merge, force } => backup::restore(&path, merge, force),
        Projects { action } => match action {
            ProjectAction::List => projects::list(),
            ProjectAction::Delete { name, force } => projects::delete(&name, force),
        },
        ResetKey { force } => reset_key::execute(force),
        Completions { shell } => completions::execute(shell),
    }
}
