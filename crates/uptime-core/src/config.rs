use crate::calendar::parse_timezone;
use crate::error::{Result, UptimeError};
use crate::paths;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration, read from `uptime.yaml` at the root.
///
/// Every field has a default, so a missing or partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Zone used for stores without a timezone assignment.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Directory holding `store_status.csv`, `menu_hours.csv`, `timezone.csv`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Background workers draining the report queue.
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".uptime/reports.db")
}

fn default_workers() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
            db_path: default_db_path(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Config {
    /// Load `uptime.yaml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.default_timezone).map_err(|_| {
            UptimeError::InvalidConfig(format!(
                "default_timezone '{}' is not a known IANA zone",
                self.default_timezone
            ))
        })?;
        if self.workers == 0 {
            return Err(UptimeError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(UptimeError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn default_tz(&self) -> Result<Tz> {
        parse_timezone(&self.default_timezone)
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_dir)
    }

    pub fn reports_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.reports_dir)
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.db_path)
    }

    /// Copy with every relative path anchored at `root`.
    pub fn anchored(&self, root: &Path) -> Self {
        Self {
            data_dir: self.data_dir(root),
            reports_dir: self.reports_dir(root),
            db_path: self.db_path(root),
            ..self.clone()
        }
    }
}
