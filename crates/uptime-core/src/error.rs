use thiserror::Error;

#[derive(Debug, Error)]
pub enum UptimeError {
    #[error("report not found: {0}")]
    ReportNotFound(String),

    #[error("invalid transition for report {report_id}: {from} -> {to}")]
    InvalidTransition {
        report_id: String,
        from: String,
        to: String,
    },

    #[error("report {0} is complete but its artifact is missing")]
    MissingArtifact(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("invalid status '{0}': expected 'active' or 'inactive'")]
    InvalidStatus(String),

    #[error("unable to parse timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unable to parse time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("invalid day of week '{0}': expected 0 (Monday) through 6 (Sunday)")]
    InvalidDayOfWeek(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("data provider error: {0}")]
    Provider(String),

    #[error("job store error: {0}")]
    JobStore(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, UptimeError>;
