use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uptime_core::config::Config;
use uptime_core::report::{Dispatch, Enqueue, MemoryJobStore, NoQueue, ReportService};
use uptime_server::{build_router, AppState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accepts every job and never runs it.
struct ParkingQueue;

impl Dispatch for ParkingQueue {
    fn try_enqueue(&self, _report_id: &str) -> Enqueue {
        Enqueue::Queued
    }
}

/// Write a small dataset: one store open Mondays, one with no schedule.
fn write_dataset(dir: &Path) {
    std::fs::write(
        dir.join("store_status.csv"),
        "store_id,status,timestamp_utc\n\
         shop,active,2023-01-23 15:00:00 UTC\n\
         shop,inactive,2023-01-23 19:00:00 UTC\n\
         kiosk,active,2023-01-23 22:00:00 UTC\n\
         kiosk,inactive,2023-01-23 22:30:00 UTC\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("menu_hours.csv"),
        "store_id,dayOfWeek,start_time_local,end_time_local\n\
         shop,0,09:00:00,17:00:00\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("timezone.csv"),
        "store_id,timezone_str\nshop,America/Chicago\n",
    )
    .unwrap();
}

fn app_state(dir: &TempDir, dispatch: Arc<dyn Dispatch>) -> AppState {
    write_dataset(dir.path());
    let (dataset, _report) = uptime_core::loader::load_dir(dir.path()).unwrap();
    let config = Config::default().anchored(dir.path());
    let service = ReportService::new(
        Arc::new(dataset),
        Arc::new(MemoryJobStore::new()),
        &config,
    )
    .unwrap();
    AppState::new(Arc::new(service), dispatch)
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send_json(app: axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, method, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_without_queue_serves_csv() {
    let dir = TempDir::new().unwrap();
    let app = build_router(app_state(&dir, Arc::new(NoQueue)));

    let (status, json) = send_json(app.clone(), "POST", "/trigger_report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Complete");
    assert_eq!(json["mode"], "sync");
    let report_id = json["report_id"].as_str().unwrap().to_string();

    let (status, headers, body) = send(app, "GET", &format!("/get_report/{report_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/csv");
    assert!(headers["content-disposition"]
        .to_str()
        .unwrap()
        .contains(&format!("store_report_{report_id}.csv")));

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "store_id,uptime_last_hour,uptime_last_day,uptime_last_week,downtime_last_hour,downtime_last_day,downtime_last_week"
    );
    // now = 2023-01-23 22:30 UTC. Monday 09:00-17:00 Chicago is 15:00-23:00 UTC.
    assert_eq!(lines[1], "kiosk,60.00,24.00,168.00,0.00,0.00,0.00");
    assert_eq!(lines[2], "shop,0.00,4.00,4.00,0.00,3.50,3.50");
}

#[tokio::test]
async fn queued_report_polls_running() {
    let dir = TempDir::new().unwrap();
    let app = build_router(app_state(&dir, Arc::new(ParkingQueue)));

    let (status, json) = send_json(app.clone(), "POST", "/trigger_report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Running");
    assert_eq!(json["mode"], "async");
    let report_id = json["report_id"].as_str().unwrap().to_string();

    let (status, json) = send_json(app, "GET", &format!("/get_report/{report_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Running");
}

#[tokio::test]
async fn unknown_report_is_404() {
    let dir = TempDir::new().unwrap();
    let app = build_router(app_state(&dir, Arc::new(NoQueue)));
    let (status, json) = send_json(app, "GET", "/get_report/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Report not found");
}

#[tokio::test]
async fn deleted_artifact_is_500() {
    let dir = TempDir::new().unwrap();
    let app = build_router(app_state(&dir, Arc::new(NoQueue)));

    let (_, json) = send_json(app.clone(), "POST", "/trigger_report").await;
    let report_id = json["report_id"].as_str().unwrap().to_string();
    std::fs::remove_file(dir.path().join(format!("reports/report_{report_id}.csv"))).unwrap();

    let (status, json) = send_json(app, "GET", &format!("/get_report/{report_id}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Report file not found");
}

#[tokio::test]
async fn failed_report_is_500_with_reason() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir, Arc::new(NoQueue));
    // A plain file where the reports directory should be.
    std::fs::write(dir.path().join("reports"), "blocker").unwrap();
    let app = build_router(state);

    let (status, json) = send_json(app.clone(), "POST", "/trigger_report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Failed");
    let report_id = json["report_id"].as_str().unwrap().to_string();

    let (status, json) = send_json(app, "GET", &format!("/get_report/{report_id}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "Failed");
    assert!(json["message"].as_str().is_some());
}

#[tokio::test]
async fn list_reports_newest_first() {
    let dir = TempDir::new().unwrap();
    let app = build_router(app_state(&dir, Arc::new(ParkingQueue)));

    let (_, first) = send_json(app.clone(), "POST", "/trigger_report").await;
    let (_, second) = send_json(app.clone(), "POST", "/trigger_report").await;

    let (status, json) = send_json(app, "GET", "/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["reports"][0]["report_id"], second["report_id"]);
    assert_eq!(json["reports"][1]["report_id"], first["report_id"]);
    assert_eq!(json["reports"][0]["status"], "Running");
}
