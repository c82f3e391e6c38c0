#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use uptime_core::report::{JobStore, ReportDb};

fn uptime(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("uptime").unwrap();
    cmd.current_dir(dir.path()).env("UPTIME_ROOT", dir.path());
    cmd
}

/// One store open Mondays 09-17 Chicago, one with no schedule.
fn write_dataset(dir: &TempDir) {
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("store_status.csv"),
        "store_id,status,timestamp_utc\n\
         shop,active,2023-01-23 15:00:00 UTC\n\
         shop,inactive,2023-01-23 19:00:00 UTC\n\
         kiosk,active,2023-01-23 22:00:00 UTC\n\
         kiosk,inactive,2023-01-23 22:30:00 UTC\n",
    )
    .unwrap();
    std::fs::write(
        data.join("menu_hours.csv"),
        "store_id,dayOfWeek,start_time_local,end_time_local\n\
         shop,0,09:00:00,17:00:00\n",
    )
    .unwrap();
    std::fs::write(
        data.join("timezone.csv"),
        "store_id,timezone_str\nshop,America/Chicago\n",
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// uptime report
// ---------------------------------------------------------------------------

#[test]
fn report_prints_table() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    uptime(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("uptime_last_hour"))
        .stdout(predicate::str::contains("kiosk"))
        .stdout(predicate::str::contains("shop"));
}

#[test]
fn report_writes_csv() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    let out = dir.path().join("out/report.csv");
    uptime(&dir)
        .args(["report", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 2 stores"));

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "kiosk,60.00,24.00,168.00,0.00,0.00,0.00");
    assert_eq!(lines[2], "shop,0.00,4.00,4.00,0.00,3.50,3.50");
}

#[test]
fn report_json_uses_latest_observation() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    let output = uptime(&dir).args(["report", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["current_time"], "2023-01-23T22:30:00Z");
    assert_eq!(json["stores"].as_array().unwrap().len(), 2);
    assert_eq!(json["stores"][1]["store_id"], "shop");
}

#[test]
fn report_without_data_is_empty() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.csv");
    uptime(&dir)
        .args(["report", "--out"])
        .arg(&out)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 1);
}

// ---------------------------------------------------------------------------
// uptime check
// ---------------------------------------------------------------------------

#[test]
fn check_lists_rejected_rows() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    std::fs::write(
        dir.path().join("data/store_status.csv"),
        "store_id,status,timestamp_utc\n\
         shop,active,2023-01-23 15:00:00 UTC\n\
         shop,asleep,2023-01-23 16:00:00 UTC\n",
    )
    .unwrap();

    uptime(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected rows: 1"))
        .stdout(predicate::str::contains("store_status.csv"))
        .stdout(predicate::str::contains("asleep"));
}

#[test]
fn check_json_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    let output = uptime(&dir).args(["check", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["clean"], false);
    assert_eq!(json["missing_files"].as_array().unwrap().len(), 3);
    assert_eq!(json["stores"], 0);
}

#[test]
fn check_respects_configured_data_dir() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    std::fs::rename(dir.path().join("data"), dir.path().join("feeds")).unwrap();
    std::fs::write(dir.path().join("uptime.yaml"), "data_dir: feeds\n").unwrap();

    let output = uptime(&dir).args(["check", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["clean"], true);
    assert_eq!(json["stores"], 2);
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("uptime.yaml"),
        "default_timezone: Atlantis/Capital\n",
    )
    .unwrap();
    uptime(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// uptime status
// ---------------------------------------------------------------------------

#[test]
fn status_unknown_report_fails() {
    let dir = TempDir::new().unwrap();
    uptime(&dir)
        .args(["status", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("report not found: nope"));
}

#[test]
fn status_shows_stored_job() {
    let dir = TempDir::new().unwrap();
    {
        let db = ReportDb::open(&dir.path().join(".uptime/reports.db")).unwrap();
        db.create("r-1").unwrap();
        db.fail("r-1", "disk full").unwrap();
    }

    uptime(&dir)
        .args(["status", "r-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed"))
        .stdout(predicate::str::contains("disk full"));

    let output = uptime(&dir)
        .args(["status", "r-1", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report_id"], "r-1");
    assert_eq!(json["status"], "Failed");
}

// ---------------------------------------------------------------------------
// uptime generate
// ---------------------------------------------------------------------------

#[test]
fn generate_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    uptime(&dir)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn generate_simulates_scheduled_stores() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    uptime(&dir)
        .args(["generate", "--force", "--seed", "42", "--end", "2023-01-26 17:00:00 UTC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("for 1 stores"));

    let output = uptime(&dir).args(["check", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["clean"], true);
    assert_eq!(json["stores"], 1);

    let output = uptime(&dir).args(["report", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stores"][0]["store_id"], "shop");
}

#[test]
fn generate_needs_some_stores() {
    let dir = TempDir::new().unwrap();
    uptime(&dir)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stores to simulate"));

    let output = uptime(&dir)
        .args(["generate", "--stores", "3", "--seed", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stores"], 3);
    assert!(dir.path().join("data/store_status.csv").exists());
}
