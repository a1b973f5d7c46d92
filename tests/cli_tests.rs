//! CLI surface tests.
//!
//! Only paths that never reach the OS keyring are exercised here; vault
//! behavior is covered by the library tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn cellar() -> Command {
    Command::cargo_bin("cellar").expect("cellar binary")
}

#[test]
fn test_help_lists_subcommands() {
    cellar()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("backup"));
}

#[test]
fn test_version_flag() {
    cellar()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cellar"));
}

#[test]
fn test_get_outside_project_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    cellar()
        .current_dir(dir.path())
        .args(["get", "DATABASE_URL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"))
        .stdout(predicate::str::contains("cellar init"));
}

#[test]
fn test_list_outside_project_fails() {
    let dir = tempfile::tempdir().unwrap();

    cellar()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_run_outside_project_fails() {
    let dir = tempfile::tempdir().unwrap();

    cellar()
        .current_dir(dir.path())
        .args(["run", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_run_requires_a_command() {
    cellar().arg("run").assert().failure();
}

#[test]
fn test_completions_bash() {
    cellar()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cellar"));
}

#[test]
fn test_sync_requires_server() {
    let dir = tempfile::tempdir().unwrap();

    cellar()
        .current_dir(dir.path())
        .env_remove("CELLAR_SYNC_URL")
        .env_remove("CELLAR_SYNC_TOKEN")
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--server"));
}

#[test]
fn test_push_and_pull_flags_conflict() {
    let dir = tempfile::tempdir().unwrap();

    cellar()
        .current_dir(dir.path())
        .args(["sync", "--push", "--pull", "--server", "http://x", "--token", "t"])
        .assert()
        .failure();
}
