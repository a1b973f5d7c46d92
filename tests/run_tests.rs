//! Run-command tests: secret injection into a child process.

#![cfg(unix)]

mod support;

use cellar::cli::run::run_with_secrets;
use support::{init_project, vault};

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

#[test]
fn test_run_injects_secrets() {
    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "FOO", "bar", None).unwrap();

    let code = run_with_secrets(&v, &pid, "development", &sh("test \"$FOO\" = bar")).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_run_scopes_to_requested_environment() {
    let v = vault();
    let pid = init_project(&v, "app");
    v.set(&pid, "development", "DEV_ONLY", "x", None).unwrap();

    // The staging run must not see development's secrets.
    let code = run_with_secrets(&v, &pid, "staging", &sh("test -z \"$DEV_ONLY\"")).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_run_propagates_exit_code() {
    let v = vault();
    let pid = init_project(&v, "app");

    let code = run_with_secrets(&v, &pid, "development", &sh("exit 7")).unwrap();
    assert_eq!(code, 7);
}

#[test]
fn test_run_unknown_environment_fails() {
    let v = vault();
    let pid = init_project(&v, "app");

    assert!(run_with_secrets(&v, &pid, "qa", &sh("true")).is_err());
}

#[test]
fn test_run_without_command_fails() {
    let v = vault();
    let pid = init_project(&v, "app");

    assert!(run_with_secrets(&v, &pid, "development", &[]).is_err());
}
