use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "uptime.yaml";

pub const STORE_STATUS_CSV: &str = "store_status.csv";
pub const MENU_HOURS_CSV: &str = "menu_hours.csv";
pub const TIMEZONE_CSV: &str = "timezone.csv";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root unless it is absolute.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

pub fn report_file_name(report_id: &str) -> String {
    format!("report_{report_id}.csv")
}

pub fn report_path(reports_dir: &Path, report_id: &str) -> PathBuf {
    reports_dir.join(report_file_name(report_id))
}
