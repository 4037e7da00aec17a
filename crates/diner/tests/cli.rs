// CLI contract tests for the `diner` binary
//
// Runs use tiny time units and zero think/eat periods so that every table
// stalls right after the settle delay.

use assert_cmd::Command;
use predicates::prelude::*;

fn diner(workdir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_diner"));
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("DINER_TABLE_COUNT")
        .env_remove("DINER_SEATS_PER_TABLE")
        .env_remove("DINER_MAX_RUNTIME")
        .env_remove("DINER_TIME_UNIT_MS");
    cmd
}

#[test]
fn test_help_lists_flags() {
    let dir = tempfile::tempdir().unwrap();
    diner(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tables"))
        .stdout(predicate::str::contains("--max-runtime"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_overflow_deadlock_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    diner(&dir)
        .args([
            "--think-max", "0", "--eat-max", "0", "--settle", "4", "--poll", "2",
            "--time-unit-ms", "5", "--max-runtime", "4000",
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Deadlock at table"))
        .stdout(predicate::str::contains("Overflow table deadlocked after"))
        .stdout(predicate::str::contains("Last agent to migrate: "));
}

#[test]
fn test_run_cap_exits_with_timeout_code() {
    // A single table of two never fills the overflow table
    let dir = tempfile::tempdir().unwrap();
    diner(&dir)
        .args([
            "--tables", "1", "--seats", "2", "--think-max", "0", "--eat-max", "0",
            "--settle", "1", "--poll", "1", "--time-unit-ms", "5", "--max-runtime", "40",
            "--quiet",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("run time cap reached"))
        .stdout(predicate::str::contains("is thinking").not());
}

#[test]
fn test_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let output = diner(&dir)
        .args([
            "--tables", "1", "--seats", "2", "--think-max", "0", "--eat-max", "0",
            "--settle", "1", "--poll", "1", "--time-unit-ms", "5", "--max-runtime", "20",
            "--json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(lines.len() > 1);

    let (summary, events) = lines.split_last().unwrap();
    assert_eq!(summary["outcome"], "timed_out");
    assert!(events.iter().all(|e| e["kind"].is_string()));
    assert!(events.iter().any(|e| e["kind"] == "deadlock_detected"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    diner(&dir)
        .args(["--seats", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn test_project_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("diner.toml"), "seats_per_table = 0\n").unwrap();
    diner(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("seats_per_table"));
}
