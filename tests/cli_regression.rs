// Regression test: ensure CLI errors are rendered with miette diagnostics.
// Requires: assert_cmd, predicates crates in [dev-dependencies]
//
// Sources live under tests/fixtures/ and are handed to the binary by path
// directly, the same fixture-per-scenario layout tests/scenarios.rs uses.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn cli_reports_miette_diagnostics_on_precheck_failure() {
    let mut cmd = Command::cargo_bin("sympath").unwrap();
    cmd.arg("analyze")
        .arg("tests/fixtures/unsupported_parameter_type.txt");
    cmd.assert()
        .failure()
        .stderr(contains("sympath::precheck_failed"));
}

#[test]
fn cli_prints_empty_array_when_every_path_is_satisfiable() {
    let mut cmd = Command::cargo_bin("sympath").unwrap();
    cmd.arg("analyze")
        .arg("tests/fixtures/independent_branches.txt")
        .arg("--json");
    cmd.assert().success().stdout(contains("[]"));
}

#[test]
fn cli_prints_unreachable_note_for_contradictory_branch() {
    let mut cmd = Command::cargo_bin("sympath").unwrap();
    cmd.arg("analyze")
        .arg("tests/fixtures/contradictory_nested_single_line.txt")
        .arg("--json");
    cmd.assert().success().stdout(contains("\"reachable\": false"));
}
