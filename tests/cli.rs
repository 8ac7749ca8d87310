use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("redsona").expect("binary built")
}

#[test]
fn version_flag_works() {
    cmd().arg("--version").assert().success().stdout(contains("redsona"));
}

#[test]
fn analyze_help_names_the_target() {
    cmd()
        .args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(contains("TARGET"));
}
