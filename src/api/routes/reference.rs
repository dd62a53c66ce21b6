//! Reference Routes
//!
//! Read-only catalog lookups.
//!
//! - GET /api/v1/reference/fields/:table
//! - GET /api/v1/reference/functions
//! - GET /api/v1/reference/functions/:category
//! - GET /api/v1/reference/operators
//! - GET /api/v1/reference/time-clauses

use axum::{extract::Path, Json};

use crate::api::dto::{FieldsResponse, OperatorsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::catalog::{self, FieldEntry, FunctionCategory, OperatorGroup, TimeClauseEntry};
use crate::query::Table;

/// GET /api/v1/reference/fields/:table
pub async fn fields(Path(table): Path<String>) -> ApiResult<Json<FieldsResponse>> {
    let table: Table = table
        .parse()
        .map_err(|e: crate::query::QueryError| ApiError::NotFound(e.to_string()))?;

    Ok(Json(FieldsResponse {
        table,
        fields: catalog::list_fields(table),
        groups: catalog::field_groups(table),
    }))
}

/// GET /api/v1/reference/functions
pub async fn function_categories() -> Json<&'static [FunctionCategory]> {
    Json(catalog::function_categories())
}

/// GET /api/v1/reference/functions/:category
///
/// Accepts the category label or its slug.
pub async fn functions(Path(category): Path<String>) -> ApiResult<Json<&'static [FieldEntry]>> {
    let functions = catalog::list_functions(&category);
    if functions.is_empty() {
        return Err(ApiError::NotFound(format!(
            "Function category '{}'",
            category
        )));
    }
    Ok(Json(functions))
}

/// GET /api/v1/reference/operators
pub async fn operators() -> Json<OperatorsResponse> {
    Json(OperatorsResponse {
        comparison: catalog::operators_in(OperatorGroup::Comparison),
        string: catalog::operators_in(OperatorGroup::String),
        logical: catalog::operators_in(OperatorGroup::Logical),
    })
}

/// GET /api/v1/reference/time-clauses
pub async fn time_clauses() -> Json<&'static [TimeClauseEntry]> {
    Json(catalog::list_time_clauses())
}
