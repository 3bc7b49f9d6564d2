//! Application state shared by every connection: configuration and the backend gateways.
//!
//! Nothing here is mutable. Per-visit state lives in the connection's
//! `logic::Workspace`, never in `AppState`.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::backend::BackendClient;
use crate::config::{load_console_config_from_env, ConsoleConfig};
use crate::error::ConsoleError;
use crate::gateway::{Judge, ProblemSource, Tutor};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConsoleConfig>,
    pub problems: Arc<dyn ProblemSource>,
    pub judge: Arc<dyn Judge>,
    pub tutor: Arc<dyn Tutor>,
}

impl AppState {
    /// Build state from env: load config, then point one HTTP client at the backend.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, ConsoleError> {
        let config = load_console_config_from_env();
        let client = Arc::new(BackendClient::new(config.backend.base_url.clone())?);
        info!(target: "console_host", base_url = %client.base_url, "Backend client ready");
        Ok(Self::with_backends(config, client.clone(), client.clone(), client))
    }

    pub fn with_backends(
        config: ConsoleConfig,
        problems: Arc<dyn ProblemSource>,
        judge: Arc<dyn Judge>,
        tutor: Arc<dyn Tutor>,
    ) -> Self {
        Self { config: Arc::new(config), problems, judge, tutor }
    }
}
