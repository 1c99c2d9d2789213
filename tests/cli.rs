use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("stokes")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log"))
        .stdout(predicate::str::contains("--theme"))
        .stdout(predicate::str::contains("--color-scale"));
}

#[test]
fn test_missing_file_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.h5");

    Command::cargo_bin("stokes")
        .unwrap()
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_unknown_theme_rejected() {
    Command::cargo_bin("stokes")
        .unwrap()
        .args(["--theme", "solarized"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
