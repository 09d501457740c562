use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_sync_subcommand() {
    let mut cmd = Command::cargo_bin("canvas-sync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synchronize"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_requires_a_config_argument() {
    let mut cmd = Command::cargo_bin("canvas-sync").unwrap();
    cmd.arg("sync").assert().failure();
}

#[test]
fn sync_with_missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("canvas-sync").unwrap();
    cmd.args(["sync", "--config", "/definitely/not/here.yaml"])
        .assert()
        .failure();
}
