use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Point-in-time state reported by a store poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::UptimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            _ => Err(crate::error::UptimeError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ReportStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a report job.
///
/// Transitions: `Running → Complete | Failed`, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Running,
    Complete,
    Failed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Running => "Running",
            ReportStatus::Complete => "Complete",
            ReportStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::Running)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TimeUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
        }
    }

    /// Convert a span to this unit, keeping sub-second precision.
    pub fn from_span(self, span: TimeDelta) -> f64 {
        let micros = span.num_microseconds().unwrap_or(i64::MAX) as f64;
        micros / 1_000_000.0 / self.seconds_per_unit()
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Trailing lookback period relative to the report's reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    LastHour,
    LastDay,
    LastWeek,
}

impl Window {
    pub fn all() -> &'static [Window] {
        &[Window::LastHour, Window::LastDay, Window::LastWeek]
    }

    pub fn lookback(self) -> TimeDelta {
        match self {
            Window::LastHour => TimeDelta::hours(1),
            Window::LastDay => TimeDelta::days(1),
            Window::LastWeek => TimeDelta::weeks(1),
        }
    }

    /// The hour window reports minutes; the day and week windows report hours.
    pub fn unit(self) -> TimeUnit {
        match self {
            Window::LastHour => TimeUnit::Minutes,
            Window::LastDay | Window::LastWeek => TimeUnit::Hours,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("active".parse::<Status>().unwrap(), Status::Active);
        assert_eq!("Inactive".parse::<Status>().unwrap(), Status::Inactive);
        assert_eq!(" ACTIVE ".parse::<Status>().unwrap(), Status::Active);
        assert!("open".parse::<Status>().is_err());
    }

    #[test]
    fn report_status_serializes_capitalized() {
        let json = serde_json::to_string(&ReportStatus::Complete).unwrap();
        assert_eq!(json, "\"Complete\"");
        assert!(!ReportStatus::Running.is_terminal());
        assert!(ReportStatus::Failed.is_terminal());
    }

    #[test]
    fn window_units() {
        assert_eq!(Window::LastHour.unit(), TimeUnit::Minutes);
        assert_eq!(Window::LastDay.unit(), TimeUnit::Hours);
        assert_eq!(Window::LastWeek.lookback(), TimeDelta::days(7));
    }

    #[test]
    fn unit_conversion_keeps_fractions() {
        let span = TimeDelta::seconds(90);
        assert_eq!(TimeUnit::Minutes.from_span(span), 1.5);
        assert_eq!(TimeUnit::Hours.from_span(TimeDelta::minutes(45)), 0.75);
    }
}
