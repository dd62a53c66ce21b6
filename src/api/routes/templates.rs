//! Template Routes
//!
//! - GET /api/v1/templates - All templates, optionally `?category=`
//! - GET /api/v1/templates/categories - Category names with counts
//! - GET /api/v1/templates/search?q= - Keyword search
//! - GET /api/v1/templates/:name - One template
//! - POST /api/v1/templates/:name/render - Fill placeholders

use axum::{
    extract::{Path, Query},
    Json,
};

use crate::api::dto::{
    CategorySummary, RenderRequest, RenderResponse, TemplateListParams, TemplateSearchParams,
};
use crate::api::error::{ApiError, ApiResult};
use crate::query::TimeWindow;
use crate::templates::{self, TemplateEntry};

/// GET /api/v1/templates
pub async fn list_templates(
    Query(params): Query<TemplateListParams>,
) -> Json<Vec<&'static TemplateEntry>> {
    let entries = match params.category.as_deref() {
        Some(category) => templates::list_templates(category),
        None => templates::all_templates().iter().collect(),
    };
    Json(entries)
}

/// GET /api/v1/templates/categories
pub async fn list_categories() -> Json<Vec<CategorySummary>> {
    let categories = templates::list_categories()
        .iter()
        .map(|&name| CategorySummary {
            name,
            count: templates::list_templates(name).len(),
        })
        .collect();
    Json(categories)
}

/// GET /api/v1/templates/search?q=
pub async fn search_templates(
    Query(params): Query<TemplateSearchParams>,
) -> ApiResult<Json<Vec<&'static TemplateEntry>>> {
    if params.q.trim().is_empty() {
        return Err(ApiError::Validation("q cannot be empty".to_string()));
    }

    let hits = templates::search_templates(&params.q)
        .into_iter()
        .map(|(_, template)| template)
        .collect();
    Ok(Json(hits))
}

/// GET /api/v1/templates/:name
pub async fn get_template(Path(name): Path<String>) -> ApiResult<Json<&'static TemplateEntry>> {
    find(&name).map(Json)
}

/// POST /api/v1/templates/:name/render
pub async fn render_template(
    Path(name): Path<String>,
    Json(req): Json<RenderRequest>,
) -> ApiResult<Json<RenderResponse>> {
    let template = find(&name)?;

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

    let query = template.render(&req.values);
    let query = templates::with_time_window(&query, &window);
    let unfilled = templates::placeholders(&query);

    tracing::debug!(template = template.name, unfilled = unfilled.len(), "Rendered template");

    Ok(Json(RenderResponse {
        name: template.name,
        query,
        unfilled,
    }))
}

fn find(name: &str) -> ApiResult<&'static TemplateEntry> {
    templates::get_template(name)
        .ok_or_else(|| ApiError::NotFound(format!("Template '{}'", name)))
}
