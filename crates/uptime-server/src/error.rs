use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uptime_core::error::UptimeError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<UptimeError>() {
            match e {
                UptimeError::ReportNotFound(_) => StatusCode::NOT_FOUND,
                UptimeError::InvalidTransition { .. } => StatusCode::CONFLICT,
                UptimeError::UnknownTimezone(_)
                | UptimeError::InvalidStatus(_)
                | UptimeError::InvalidTimestamp(_)
                | UptimeError::InvalidTimeOfDay(_)
                | UptimeError::InvalidDayOfWeek(_) => StatusCode::BAD_REQUEST,
                UptimeError::MissingArtifact(_)
                | UptimeError::InvalidConfig(_)
                | UptimeError::Provider(_)
                | UptimeError::JobStore(_)
                | UptimeError::Io(_)
                | UptimeError::Yaml(_)
                | UptimeError::Json(_)
                | UptimeError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_not_found_maps_to_404() {
        let err = AppError(UptimeError::ReportNotFound("r1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_transition_maps_to_409() {
        let err = AppError(
            UptimeError::InvalidTransition {
                report_id: "r1".into(),
                from: "Complete".into(),
                to: "Failed".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_timezone_maps_to_400() {
        let err = AppError(UptimeError::UnknownTimezone("Mars/Base".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn job_store_error_maps_to_500() {
        let err = AppError(UptimeError::JobStore("disk full".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_uptime_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(UptimeError::ReportNotFound("r1".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
