//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::templates;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Ready once the validator has checks to run.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if is_ready(&state) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if is_ready(&state) { "healthy" } else { "unhealthy" };

    Json(HealthResponse {
        status: status.to_string(),
        validator_checks: state.validator.check_count(),
        templates: templates::all_templates().len(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn is_ready(state: &AppState) -> bool {
    state.validator.check_count() > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, BuilderConfig};
    use crate::validator::Validator;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_without_checks() {
        let state = AppState::with_validator(
            ApiConfig::default(),
            BuilderConfig::default(),
            Validator::with_checks(Vec::new()),
        );
        let status = readiness(State(Arc::new(state))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
