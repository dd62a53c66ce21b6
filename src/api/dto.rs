//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::{FieldEntry, FieldGroup};
use crate::query::{SortDirection, Table, TimeWindow};
use crate::validator::{Finding, ValidationReport};

// ============================================
// BUILD DTOs
// ============================================

/// Query build request
///
/// Field names follow the web form; camelCase spellings are accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct BuildRequest {
    /// Table, defaults to the configured table
    #[serde(default, alias = "from")]
    pub table: Option<Table>,
    /// SELECT columns, defaults to `*`
    #[serde(default)]
    pub select: Vec<String>,
    /// WHERE predicates
    #[serde(default, rename = "where", alias = "conditions")]
    pub conditions: Vec<String>,
    #[serde(default, alias = "groupBy")]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub having: Vec<String>,
    #[serde(default, alias = "orderBy")]
    pub order_by: Vec<String>,
    /// ORDER BY direction, defaults to the configured direction
    #[serde(default, alias = "orderDir")]
    pub order_dir: Option<SortDirection>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Structured time window
    #[serde(default, alias = "timeWindow")]
    pub time_window: Option<TimeWindow>,
    /// Raw time clause, e.g. "LAST 24 HOURS"
    #[serde(default)]
    pub time: Option<String>,
}

/// Query build response
#[derive(Debug, Serialize)]
pub struct BuildResponse {
    /// Single-line query
    pub query: String,
    /// One clause per line
    pub formatted: String,
    /// No error-level findings
    pub valid: bool,
    pub findings: Vec<Finding>,
}

// ============================================
// VALIDATE DTOs
// ============================================

/// Validation request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub query: String,
}

/// Validation response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub suggestion_count: usize,
    pub findings: Vec<Finding>,
}

impl From<ValidationReport> for ValidateResponse {
    fn from(report: ValidationReport) -> Self {
        Self {
            valid: report.is_valid(),
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            suggestion_count: report.suggestion_count(),
            findings: report.into_findings(),
        }
    }
}

// ============================================
// TEMPLATE DTOs
// ============================================

/// Template list filter
#[derive(Debug, Default, Deserialize)]
pub struct TemplateListParams {
    #[serde(default)]
    pub category: Option<String>,
}

/// Template search parameters
#[derive(Debug, Deserialize)]
pub struct TemplateSearchParams {
    pub q: String,
}

/// Category with its template count
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: &'static str,
    pub count: usize,
}

/// Template render request
#[derive(Debug, Default, Deserialize)]
pub struct RenderRequest {
    /// Placeholder values keyed by name, case-insensitive
    #[serde(default)]
    pub values: HashMap<String, String>,
    #[serde(default, alias = "timeWindow")]
    pub time_window: Option<TimeWindow>,
    /// Raw time clause replacing the template's own
    #[serde(default)]
    pub time: Option<String>,
}

/// Template render response
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub name: &'static str,
    pub query: String,
    /// Placeholders left without a value
    pub unfilled: Vec<String>,
}

// ============================================
// REFERENCE DTOs
// ============================================

/// Fields of one table
#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub table: Table,
    pub fields: &'static [FieldEntry],
    pub groups: &'static [FieldGroup],
}

/// Operators by group
#[derive(Debug, Serialize)]
pub struct OperatorsResponse {
    pub comparison: &'static [FieldEntry],
    pub string: &'static [FieldEntry],
    pub logical: &'static [FieldEntry],
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Number of validator checks loaded
    pub validator_checks: usize,
    /// Number of templates available
    pub templates: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TimeUnit;

    #[test]
    fn test_build_request_accepts_form_names() {
        let req: BuildRequest = serde_json::from_str(
            r#"{
                "from": "flows",
                "select": ["sourceip"],
                "where": ["sourcebytes > 1000"],
                "groupBy": ["sourceip"],
                "orderBy": ["sourceip"],
                "orderDir": "asc",
                "limit": 5,
                "time": "LAST 1 HOURS"
            }"#,
        )
        .unwrap();

        assert_eq!(req.table, Some(Table::Flows));
        assert_eq!(req.conditions, vec!["sourcebytes > 1000"]);
        assert_eq!(req.group_by, vec!["sourceip"]);
        assert_eq!(req.order_dir, Some(SortDirection::Asc));
        assert_eq!(req.limit, Some(5));
        assert_eq!(req.time.as_deref(), Some("LAST 1 HOURS"));
    }

    #[test]
    fn test_build_request_structured_window() {
        let req: BuildRequest = serde_json::from_str(
            r#"{"time_window": {"kind": "relative", "amount": 7, "unit": "DAYS"}}"#,
        )
        .unwrap();
        assert_eq!(req.time_window, Some(TimeWindow::last(7, TimeUnit::Days)));
        assert!(req.select.is_empty());
    }
}
