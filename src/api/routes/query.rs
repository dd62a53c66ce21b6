//! Query Routes
//!
//! Endpoints for assembling and checking AQL queries.
//!
//! - POST /api/v1/build - Assemble a query from clause selections
//! - POST /api/v1/validate - Validate query text

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{BuildRequest, BuildResponse, ValidateRequest, ValidateResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::BuilderConfig;
use crate::query::{assemble, assemble_multiline, QueryDraft, TimeWindow};

/// POST /api/v1/build
///
/// Assemble a draft, then validate the result. Missing table, columns and
/// direction fall back to the configured defaults.
pub async fn build_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BuildRequest>,
) -> ApiResult<Json<BuildResponse>> {
    let draft = draft_from_request(req, &state.builder)?;

    let query = assemble(&draft)?;
    let formatted = assemble_multiline(&draft)?;
    let report = state.validator.validate(&query);

    tracing::debug!(
        table = ?draft.table,
        conditions = draft.conditions.len(),
        errors = report.error_count(),
        "Built query"
    );

    Ok(Json(BuildResponse {
        query,
        formatted,
        valid: report.is_valid(),
        findings: report.into_findings(),
    }))
}

/// POST /api/v1/validate
pub async fn validate_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    Json(state.validator.validate(&req.query).into())
}

/// Turn a build request into a draft
fn draft_from_request(req: BuildRequest, defaults: &BuilderConfig) -> ApiResult<QueryDraft> {
    let mut draft = QueryDraft::new(req.table.unwrap_or(defaults.default_table));

    if req.select.iter().all(|c| c.trim().is_empty()) {
        draft.set_columns(["*"]);
    } else {
        draft.set_columns(req.select);
    }

    for condition in req.conditions {
        draft.add_condition(condition);
    }
    draft.set_group_by(req.group_by);
    for condition in req.having {
        draft.add_having(condition);
    }
    draft.set_order_by(
        req.order_by,
        req.order_dir.unwrap_or(defaults.default_order),
    );

    if let Some(limit) = req.limit {
        draft.set_limit(limit)?;
    }

    let window = match (req.time_window, req.time) {
        (Some(_), Some(_)) => {
            return Err(ApiError::Validation(
                "use either time_window or time, not both".to_string(),
            ))
        }
        (Some(window), None) => {
            window.validate()?;
            window
        }
        (None, Some(text)) if !text.trim().is_empty() => TimeWindow::parse(&text)?,
        _ => TimeWindow::None,
    };
    draft.set_time_window(window);

    Ok(draft)
}
