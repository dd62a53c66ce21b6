//! AQL Builder REST API
//!
//! HTTP API layer over the catalog, templates, assembler and validator,
//! built with Axum. No query is ever executed; the API only produces and
//! checks query text.
//!
//! # Endpoints
//!
//! ## UI
//! - `GET /` - Browser form
//!
//! ## Query
//! - `POST /api/v1/build` - Assemble a query from clause selections
//! - `POST /api/v1/validate` - Validate query text
//!
//! ## Templates
//! - `GET /api/v1/templates` - List templates (`?category=` to filter)
//! - `GET /api/v1/templates/categories` - Category names and counts
//! - `GET /api/v1/templates/search?q=` - Keyword search
//! - `GET /api/v1/templates/:name` - One template
//! - `POST /api/v1/templates/:name/render` - Fill placeholders and time range
//!
//! ## Reference
//! - `GET /api/v1/reference/fields/:table` - Fields of `events` or `flows`
//! - `GET /api/v1/reference/functions` - Function categories
//! - `GET /api/v1/reference/functions/:category` - Functions of one category
//! - `GET /api/v1/reference/operators` - Operators by group
//! - `GET /api/v1/reference/time-clauses` - Time clause examples
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use aql_builder::api::{serve, AppState};
//! use aql_builder::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let state = AppState::from_config(&config);
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Query routes
        .route("/build", post(routes::query::build_query))
        .route("/validate", post(routes::query::validate_query))
        // Template routes
        .route("/templates", get(routes::templates::list_templates))
        .route("/templates/categories", get(routes::templates::list_categories))
        .route("/templates/search", get(routes::templates::search_templates))
        .route("/templates/:name", get(routes::templates::get_template))
        .route("/templates/:name/render", post(routes::templates::render_template))
        // Reference routes
        .route("/reference/fields/:table", get(routes::reference::fields))
        .route("/reference/functions", get(routes::reference::function_categories))
        .route("/reference/functions/:category", get(routes::reference::functions))
        .route("/reference/operators", get(routes::reference::operators))
        .route("/reference/time-clauses", get(routes::reference::time_clauses))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));
    let cors = cors_layer(&state.config.cors_origins);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::ui::index))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS policy: any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("AQL Builder API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("AQL Builder API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(ApiConfig::default(), BuilderConfig::default());
        build_router(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = create_test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, body) = send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health/live", "/health/ready", "/health"] {
            let (status, _) = send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
        }

        let (_, body) = get_json("/health").await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["validator_checks"], 18);
        assert_eq!(body["templates"], 26);
    }

    #[tokio::test]
    async fn test_index_page() {
        let (status, body) = send(Request::builder().uri("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("AQL Builder"));
    }

    #[tokio::test]
    async fn test_reference_fields() {
        let (status, body) = get_json("/api/v1/reference/fields/events").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"], "events");
        assert_eq!(body["fields"].as_array().unwrap().len(), 34);
        assert_eq!(body["fields"][0]["name"], "qid");

        let (status, body) = get_json("/api/v1/reference/fields/assets").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_reference_functions_and_operators() {
        let (_, body) = get_json("/api/v1/reference/functions").await;
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (status, body) = get_json("/api/v1/reference/functions/aggregation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);

        let (status, _) = get_json("/api/v1/reference/functions/crypto").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json("/api/v1/reference/operators").await;
        assert_eq!(body["comparison"].as_array().unwrap().len(), 11);
        assert_eq!(body["logical"][0]["name"], "AND");

        let (_, body) = get_json("/api/v1/reference/time-clauses").await;
        assert_eq!(body.as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_template_listing() {
        let (_, body) = get_json("/api/v1/templates").await;
        assert_eq!(body.as_array().unwrap().len(), 26);

        let (_, body) = get_json("/api/v1/templates?category=Windows%20Events").await;
        assert_eq!(body.as_array().unwrap().len(), 4);

        let (_, body) = get_json("/api/v1/templates/categories").await;
        assert_eq!(body[0]["name"], "Authentication & Access");
        assert_eq!(body[0]["count"], 4);

        let (_, body) = get_json("/api/v1/templates/search?q=exfiltration").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = get_json("/api/v1/templates/ssh%20connections").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "SSH Connections");

        let (status, _) = get_json("/api/v1/templates/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_template() {
        let (status, body) = post_json(
            "/api/v1/templates/Activity%20by%20IP%20Address/render",
            json!({ "values": { "ip_address": "10.1.1.1" }, "time": "LAST 1 HOURS" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("sourceip = '10.1.1.1'"));
        assert!(query.ends_with("LAST 1 HOURS"));
        assert!(body["unfilled"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_query() {
        let (status, body) = post_json(
            "/api/v1/build",
            json!({
                "select": ["sourceip"],
                "where": ["magnitude >= 7"],
                "limit": 10,
                "time": "LAST 24 HOURS"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["query"],
            "SELECT sourceip FROM events WHERE magnitude >= 7 LIMIT 10 LAST 24 HOURS"
        );
        assert_eq!(
            body["formatted"],
            "SELECT sourceip\nFROM events\nWHERE magnitude >= 7\nLIMIT 10\nLAST 24 HOURS"
        );
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn test_build_rejects_bad_input() {
        let (status, body) = post_json("/api/v1/build", json!({ "limit": 0 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_LIMIT");

        let (status, body) = post_json("/api/v1/build", json!({ "time": "yesterday" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_TIME_WINDOW");
    }

    #[tokio::test]
    async fn test_validate_query() {
        let (status, body) =
            post_json("/api/v1/validate", json!({ "query": "SELECT * FORM events" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert!(body["error_count"].as_u64().unwrap() >= 1);
        assert!(body["findings"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["check"] == "common_typos"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (status, _) = send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/validate")
                .header("Content-Type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cors_origins_accepted() {
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }
}
