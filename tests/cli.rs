//! CLI surface tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("voyagent")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("serve")
                .and(predicate::str::contains("chat"))
                .and(predicate::str::contains("--config")),
        );
}

#[test]
fn test_version_prints_name() {
    Command::cargo_bin("voyagent")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voyagent"));
}

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("voyagent")
        .unwrap()
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("teleport"));
}

#[test]
fn test_missing_command_fails() {
    Command::cargo_bin("voyagent").unwrap().assert().failure();
}
