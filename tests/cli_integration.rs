use std::path::Path;

use assert_cmd::Command;

fn racer(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("typing-racer").unwrap();
    cmd.arg("--data-file")
        .arg(dir.join("store.json"))
        .arg("--config")
        .arg(dir.join("config.json"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn empty_leaderboard() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout_of(racer(dir.path()).arg("--leaderboard"));
    assert!(out.contains("No races yet"));
}

#[test]
fn register_then_profile() {
    let dir = tempfile::tempdir().unwrap();

    let out = stdout_of(racer(dir.path()).args([
        "--register",
        "racer",
        "--email",
        "racer@example.com",
        "--color",
        "#EC4899",
    ]));
    assert!(out.contains("Welcome, racer!"));

    let out = stdout_of(racer(dir.path()).arg("--profile"));
    assert!(out.contains("racer <racer@example.com>"));
    assert!(out.contains("races: 0"));
    assert!(out.contains("achievements: 0/11"));
}

#[test]
fn duplicate_email_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    racer(dir.path())
        .args(["--register", "one", "--email", "same@example.com"])
        .assert()
        .success();

    let output = racer(dir.path())
        .args(["--register", "two", "--email", "SAME@example.com"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(output).unwrap().contains("Email already registered"));
}

#[test]
fn login_logout_cycle() {
    let dir = tempfile::tempdir().unwrap();
    racer(dir.path())
        .args(["--register", "cyc", "--email", "cyc@example.com"])
        .assert()
        .success();

    let out = stdout_of(racer(dir.path()).arg("--logout"));
    assert!(out.contains("Signed out."));

    racer(dir.path()).arg("--profile").assert().failure();

    let unknown = racer(dir.path())
        .args(["--login", "nobody@example.com"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(unknown).unwrap().contains("Invalid email or password"));

    let out = stdout_of(racer(dir.path()).args(["--login", "cyc@example.com"]));
    assert!(out.contains("Signed in as cyc."));
}

#[test]
fn export_without_races_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("history.csv");
    racer(dir.path())
        .args(["--register", "exp", "--email", "exp@example.com"])
        .assert()
        .success();

    let out = stdout_of(racer(dir.path()).arg("--export-csv").arg(&csv));
    assert!(out.contains("Exported 0 races"));
    assert!(csv.exists());
}

#[test]
fn race_without_tty_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let output = racer(dir.path())
        .write_stdin("")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(output).unwrap().contains("stdin must be a tty"));
}
