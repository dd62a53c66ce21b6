//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, BuilderConfig, Config};
use crate::validator::Validator;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Defaults applied to drafts built over HTTP
    pub builder: Arc<BuilderConfig>,
    /// Validator run on built and submitted queries
    pub validator: Arc<Validator>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ApiConfig, builder: BuilderConfig) -> Self {
        Self::with_validator(config, builder, Validator::default())
    }

    /// Create AppState with a custom check list
    pub fn with_validator(config: ApiConfig, builder: BuilderConfig, validator: Validator) -> Self {
        Self {
            config: Arc::new(config),
            builder: Arc::new(builder),
            validator: Arc::new(validator),
            start_time: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api.clone(), config.builder.clone())
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
