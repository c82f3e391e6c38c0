use std::sync::Arc;
use uptime_core::report::{Dispatch, ReportService};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReportService>,
    /// Where `POST /trigger_report` offers new jobs.
    pub dispatch: Arc<dyn Dispatch>,
}

impl AppState {
    pub fn new(service: Arc<ReportService>, dispatch: Arc<dyn Dispatch>) -> Self {
        Self { service, dispatch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptime_core::config::Config;
    use uptime_core::provider::Dataset;
    use uptime_core::report::{MemoryJobStore, NoQueue};

    #[test]
    fn state_clones_share_service() {
        let service = ReportService::new(
            Arc::new(Dataset::default()),
            Arc::new(MemoryJobStore::new()),
            &Config::default(),
        )
        .unwrap();
        let state = AppState::new(Arc::new(service), Arc::new(NoQueue));
        let copy = state.clone();
        assert!(Arc::ptr_eq(&state.service, &copy.service));
    }
}
