use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uptime_core::report::{ReportPoll, Submission};
use uptime_core::UptimeError;

use crate::error::AppError;
use crate::state::AppState;

/// Jobs returned by `GET /reports`.
const LIST_LIMIT: usize = 50;

/// POST /trigger_report: start a report and return its id.
///
/// If the worker queue cannot take the job it is generated before the
/// response is sent, so `status` may already be terminal.
pub async fn trigger_report(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = app.service.clone();
    let dispatch = app.dispatch.clone();
    let (submission, status) = tokio::task::spawn_blocking(move || {
        let submission: Submission = service.submit(dispatch.as_ref())?;
        let status = service
            .jobs()
            .get(&submission.report_id)?
            .map(|job| job.status.to_string())
            .unwrap_or_else(|| "Running".to_string());
        Ok::<_, UptimeError>((submission, status))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({
        "report_id": submission.report_id,
        "status": status,
        "mode": submission.mode,
        "message": "Report generation started",
    })))
}

/// GET /get_report/{report_id}: poll a report; the CSV once it is complete.
pub async fn get_report(
    State(app): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError> {
    let service = app.service.clone();
    let id = report_id.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let poll = service.status(&id)?;
        let data = match &poll {
            ReportPoll::Complete { path } => Some(service.read_artifact(&id, path)),
            _ => None,
        };
        Ok::<_, UptimeError>((poll, data))
    })
    .await
    .map_err(AppError::join)?;

    let (poll, data) = match outcome {
        Ok(pair) => pair,
        Err(UptimeError::MissingArtifact(_)) => return Ok(missing_file()),
        Err(e) => return Err(e.into()),
    };

    let response = match (poll, data) {
        (ReportPoll::NotFound, _) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Report not found",
                "message": format!("No report found with ID: {report_id}"),
            })),
        )
            .into_response(),
        (ReportPoll::Running, _) => Json(serde_json::json!({
            "status": "Running",
            "message": "Report is still being generated",
        }))
        .into_response(),
        (ReportPoll::Failed { reason }, _) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "status": "Failed",
                "error": "Report generation failed",
                "message": reason
                    .unwrap_or_else(|| "An error occurred during report generation".into()),
            })),
        )
            .into_response(),
        (ReportPoll::Complete { .. }, Some(Ok(bytes))) => (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"store_report_{report_id}.csv\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        (ReportPoll::Complete { .. }, Some(Err(UptimeError::MissingArtifact(_))))
        | (ReportPoll::Complete { .. }, None) => missing_file(),
        (ReportPoll::Complete { .. }, Some(Err(e))) => return Err(e.into()),
    };
    Ok(response)
}

fn missing_file() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Report file not found",
            "message": "Report completed but file is missing",
        })),
    )
        .into_response()
}

/// GET /reports: the most recent jobs, newest first.
pub async fn list_reports(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = app.service.clone();
    let jobs = tokio::task::spawn_blocking(move || service.jobs().list_recent(LIST_LIMIT))
        .await
        .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({
        "count": jobs.len(),
        "reports": jobs,
    })))
}
