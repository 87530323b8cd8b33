use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::runtime::Coordinator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            started_at: Utc::now(),
        }
    }

    /// Asset used when a run request names none
    pub fn default_asset(&self) -> &str {
        &self.coordinator.config().default_asset
    }

    /// Seconds since the server state was created
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
