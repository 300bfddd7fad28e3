#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::TempDir;

const NETWORK: &str = r#"{"tasks": [
    {"id": "A", "name": "Excavate", "duration": 3},
    {"id": "B", "duration": 4},
    {"id": "C", "duration": 2, "predecessors": [{"predecessor_id": "A"}, {"predecessor_id": "B"}]}
]}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path.to_string_lossy().into_owned()
}

#[allow(deprecated)]
fn cpm() -> Command {
    let mut cmd = Command::cargo_bin("cpm").expect("cpm binary");
    cmd.env_remove("CPM_LOG");
    cmd
}

#[test]
fn schedule_prints_table_and_summary() {
    let dir = TempDir::new().unwrap();
    let network = write(&dir, "network.json", NETWORK);
    cpm()
        .args(["schedule", &network])
        .assert()
        .success()
        .stdout(str_contains("Excavate"))
        .stdout(str_contains("critical"))
        .stdout(str_contains("tasks=3, critical=2, near_critical=1, duration=6, crit_path=B->C"));
}

#[test]
fn schedule_emits_json_snapshot() {
    let dir = TempDir::new().unwrap();
    let network = write(&dir, "network.json", NETWORK);
    let assert = cpm()
        .args(["schedule", &network, "--format", "json", "--near-critical", "0"])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["project_duration"], 6);
    assert_eq!(value["near_critical_threshold"], 0);
    assert_eq!(value["tasks"][0]["total_float"], 1);
    assert_eq!(value["tasks"][0]["is_near_critical"], false);
}

#[test]
fn schedule_reads_csv_and_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let network = write(
        &dir,
        "network.csv",
        "id,name,duration,predecessors\nA,,3,\nB,,2,A:SS+1\n",
    );
    let output = dir.path().join("out.csv");
    cpm()
        .args(["schedule", &network, "--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("id,name,duration,early_start"));
    assert!(written.contains("B,,2,1,3,"));
}

#[test]
fn schedule_adds_calendar_dates_with_epoch() {
    let dir = TempDir::new().unwrap();
    let network = write(&dir, "network.json", NETWORK);
    cpm()
        .args(["schedule", &network, "--epoch", "2025-01-06"])
        .assert()
        .success()
        .stdout(str_contains("2025-01-06"))
        .stdout(str_contains("project finish: 2025-01-13"));
}

#[test]
fn strict_mode_rejects_dangling_reference() {
    let dir = TempDir::new().unwrap();
    let network = write(
        &dir,
        "network.json",
        r#"[{"id": "A", "duration": 1, "predecessors": [{"predecessor_id": "ghost"}]}]"#,
    );
    cpm()
        .args(["schedule", &network])
        .assert()
        .success()
        .stdout(str_contains("ignored predecessor ghost on task A"));
    cpm()
        .args(["schedule", &network, "--strict"])
        .assert()
        .failure()
        .stderr(str_contains("unknown predecessor ghost"));
}

#[test]
fn check_reports_cycle_and_fails() {
    let dir = TempDir::new().unwrap();
    let network = write(
        &dir,
        "cycle.json",
        r#"[
            {"id": "A", "duration": 1, "predecessors": [{"predecessor_id": "C"}]},
            {"id": "B", "duration": 1, "predecessors": [{"predecessor_id": "A"}]},
            {"id": "C", "duration": 1, "predecessors": [{"predecessor_id": "B"}]}
        ]"#,
    );
    cpm()
        .args(["check", &network])
        .assert()
        .failure()
        .stderr(str_contains("dependency cycle detected"));
}

#[test]
fn check_accepts_valid_network() {
    let dir = TempDir::new().unwrap();
    let network = write(&dir, "network.json", NETWORK);
    cpm()
        .args(["check", &network])
        .assert()
        .success()
        .stdout(str_contains("ok: 3 tasks, acyclic, project duration 6"));
}

#[test]
fn negative_duration_names_the_task() {
    let dir = TempDir::new().unwrap();
    let network = write(&dir, "network.json", r#"[{"id": "pour", "duration": -2}]"#);
    cpm()
        .args(["schedule", &network])
        .assert()
        .failure()
        .stderr(str_contains("task pour has negative duration -2"));
}

#[test]
fn calendar_projection_out_of_range_is_an_error() {
    let dir = TempDir::new().unwrap();
    let network = write(
        &dir,
        "network.json",
        r#"[
            {"id": "A", "duration": 1},
            {"id": "B", "duration": 1, "predecessors": [{"predecessor_id": "A", "lag": 200000000}]}
        ]"#,
    );
    cpm()
        .args(["schedule", &network, "--epoch", "2025-01-06"])
        .assert()
        .failure()
        .stderr(str_contains("outside the supported date range"));
}
