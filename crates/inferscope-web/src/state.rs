//! Shared application state for the web server.

use std::sync::Arc;

use inferscope_client::{InferenceApiClient, InferenceBackend};
use inferscope_common::ApiError;

use crate::config::Config;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn InferenceBackend>,
    pub config: Config,
}

impl AppState {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: Config) -> Self {
        Self { backend, config }
    }

    /// State backed by the real HTTP client, configured from `config.backend`.
    pub fn from_config(config: Config) -> Result<Self, ApiError> {
        let client = InferenceApiClient::with_timeouts(
            &config.backend.base_url,
            config.backend.timeouts(),
        )?;
        Ok(Self::new(Arc::new(client), config))
    }
}

pub type SharedState = Arc<AppState>;
