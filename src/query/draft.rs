//! Query Draft
//!
//! The in-progress set of clause selections a user is editing. A draft is
//! created per session or request, mutated by the builder screens or the
//! HTTP form, and turned into a query string by the assembler.
//!
//! # Example
//!
//! ```rust
//! use aql_builder::query::{assemble, QueryDraft, Table, TimeUnit, TimeWindow};
//!
//! let draft = QueryDraft::new(Table::Events)
//!     .select(&["sourceip", "username"])
//!     .filter("username = 'admin'")
//!     .limit(10)
//!     .time_window(TimeWindow::last(24, TimeUnit::Hours));
//!
//! assert_eq!(
//!     assemble(&draft).unwrap(),
//!     "SELECT sourceip, username FROM events WHERE username = 'admin' LIMIT 10 LAST 24 HOURS"
//! );
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::query::error::{QueryError, QueryResult};

/// Datetime formats accepted in START/STOP clauses
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Tables an AQL query can read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Security events from log sources
    Events,
    /// Network flow data
    Flows,
}

impl Table {
    /// All tables in menu order
    pub const ALL: [Table; 2] = [Table::Events, Table::Flows];

    /// Name as written in the FROM clause
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Flows => "flows",
        }
    }

    /// Short human description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Events => "Security events from log sources",
            Self::Flows => "Network flow data",
        }
    }
}

impl FromStr for Table {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "events" | "event" => Ok(Self::Events),
            "flows" | "flow" => Ok(Self::Flows),
            other => Err(QueryError::UnknownTable(other.to_string())),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Lowest first
    #[serde(alias = "asc")]
    Asc,
    /// Highest first
    #[default]
    #[serde(alias = "desc")]
    Desc,
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(QueryError::InvalidCondition(format!(
                "sort direction must be ASC or DESC, got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// ORDER BY columns and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Columns or aggregate expressions to sort on
    pub columns: Vec<String>,
    /// Direction applied after the last column
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    /// Order by a single column
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            columns: vec![column.into()],
            direction,
        }
    }
}

/// Units for a relative (LAST) time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// All units in menu order
    pub const ALL: [TimeUnit; 3] = [TimeUnit::Minutes, TimeUnit::Hours, TimeUnit::Days];

    /// Keyword as written in the LAST clause
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes => "MINUTES",
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = QueryError;

    /// Singular forms are accepted on input and normalized to the plural keyword
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MINUTES" | "MINUTE" | "MIN" | "M" => Ok(Self::Minutes),
            "HOURS" | "HOUR" | "H" => Ok(Self::Hours),
            "DAYS" | "DAY" | "D" => Ok(Self::Days),
            other => Err(QueryError::UnknownTimeUnit(other.to_string())),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window appended after LIMIT
///
/// At most one shape is active at a time. The variants are public for
/// serde; a window that fails [`TimeWindow::validate`] renders no clause.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimeWindow {
    /// No time clause
    #[default]
    None,
    /// `LAST <amount> <UNIT>`
    Relative { amount: u32, unit: TimeUnit },
    /// `START '<start>' [STOP '<stop>']`
    Absolute {
        start: String,
        #[serde(default)]
        stop: Option<String>,
    },
}

impl TimeWindow {
    /// Relative window, e.g. `LAST 24 HOURS`
    pub fn last(amount: u32, unit: TimeUnit) -> Self {
        Self::Relative { amount, unit }
    }

    /// Absolute window with validated `yyyy-MM-dd HH:mm[:ss]` datetimes
    ///
    /// An empty `stop` is treated as absent (STOP defaults to now in AQL).
    pub fn absolute(start: impl Into<String>, stop: Option<String>) -> QueryResult<Self> {
        let window = Self::Absolute {
            start: start.into().trim().to_string(),
            stop: stop
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        window.validate()?;
        Ok(window)
    }

    /// Parse a time clause such as `LAST 7 DAYS` or `START '2024-01-01 00:00'`
    pub fn parse(text: &str) -> QueryResult<Self> {
        crate::query::time::parse_time_window(text)
    }

    /// Whether no time clause is set
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Check the datetimes of an absolute window
    pub fn validate(&self) -> QueryResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Relative { amount, .. } => {
                if *amount == 0 {
                    Err(QueryError::InvalidTimeWindow(
                        "LAST amount must be greater than zero".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
            Self::Absolute { start, stop } => {
                if start.trim().is_empty() {
                    return Err(QueryError::InvalidTimeWindow(
                        "START datetime is required".to_string(),
                    ));
                }
                check_datetime(start)?;
                if let Some(stop) = stop.as_deref().filter(|s| !s.trim().is_empty()) {
                    check_datetime(stop)?;
                }
                Ok(())
            }
        }
    }

    /// Render the clause, or `None` when nothing should be emitted
    pub fn clause(&self) -> Option<String> {
        if self.validate().is_err() {
            return None;
        }
        match self {
            Self::None => None,
            Self::Relative { amount, unit } => Some(format!("LAST {} {}", amount, unit)),
            Self::Absolute { start, stop } => {
                let start = start.trim();
                if start.is_empty() {
                    return None;
                }
                match stop.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    Some(stop) => Some(format!("START '{}' STOP '{}'", start, stop)),
                    None => Some(format!("START '{}'", start)),
                }
            }
        }
    }
}

fn check_datetime(value: &str) -> QueryResult<()> {
    let value = value.trim();
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        Ok(())
    } else {
        Err(QueryError::InvalidTimeWindow(format!(
            "'{}' is not a datetime in yyyy-MM-dd HH:mm or yyyy-MM-dd HH:mm:ss format",
            value
        )))
    }
}

/// An in-progress query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDraft {
    /// Table for the FROM clause; required
    #[serde(default)]
    pub table: Option<Table>,
    /// SELECT columns; required, `*` allowed
    #[serde(default)]
    pub columns: Vec<String>,
    /// WHERE predicates, joined with AND and inserted verbatim
    #[serde(default)]
    pub conditions: Vec<String>,
    /// GROUP BY columns
    #[serde(default)]
    pub group_by: Vec<String>,
    /// HAVING predicates, joined with AND
    #[serde(default)]
    pub having: Vec<String>,
    /// ORDER BY columns and direction
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    /// Maximum rows
    #[serde(default)]
    pub limit: Option<NonZeroU32>,
    /// Trailing time clause
    #[serde(default)]
    pub time_window: TimeWindow,
}

impl QueryDraft {
    /// Start a draft reading from `table`
    pub fn new(table: Table) -> Self {
        Self {
            table: Some(table),
            ..Default::default()
        }
    }

    // Chained construction

    /// Set the SELECT columns, dropping blank entries
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.set_columns(columns.iter().copied());
        self
    }

    /// Add a WHERE predicate
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.add_condition(condition);
        self
    }

    /// Set the GROUP BY columns, dropping blank entries
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.set_group_by(columns.iter().copied());
        self
    }

    /// Add a HAVING predicate
    pub fn having(mut self, condition: impl Into<String>) -> Self {
        self.add_having(condition);
        self
    }

    /// Set ORDER BY
    pub fn order_by(mut self, columns: &[&str], direction: SortDirection) -> Self {
        self.set_order_by(columns.iter().map(|c| c.to_string()).collect(), direction);
        self
    }

    /// Set LIMIT; zero clears it
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = NonZeroU32::new(n);
        self
    }

    /// Set the time window
    pub fn time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    // In-place editing used by the interactive builder

    pub fn set_table(&mut self, table: Table) {
        self.table = Some(table);
    }

    /// Replace the SELECT columns, dropping blank entries
    pub fn set_columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = clean_list(columns);
    }

    pub fn add_column(&mut self, column: impl Into<String>) -> bool {
        push_non_blank(&mut self.columns, column.into())
    }

    /// Add a WHERE predicate; blank input is ignored
    pub fn add_condition(&mut self, condition: impl Into<String>) -> bool {
        push_non_blank(&mut self.conditions, condition.into())
    }

    /// Remove the WHERE predicate at `index` (0-based)
    pub fn remove_condition(&mut self, index: usize) -> Option<String> {
        (index < self.conditions.len()).then(|| self.conditions.remove(index))
    }

    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
    }

    pub fn set_group_by<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = clean_list(columns);
    }

    pub fn add_having(&mut self, condition: impl Into<String>) -> bool {
        push_non_blank(&mut self.having, condition.into())
    }

    pub fn remove_having(&mut self, index: usize) -> Option<String> {
        (index < self.having.len()).then(|| self.having.remove(index))
    }

    pub fn clear_having(&mut self) {
        self.having.clear();
    }

    /// Set ORDER BY; an empty column list clears it
    pub fn set_order_by(&mut self, columns: Vec<String>, direction: SortDirection) {
        let columns = clean_list(columns);
        self.order_by = if columns.is_empty() {
            None
        } else {
            Some(OrderBy { columns, direction })
        };
    }

    pub fn clear_order_by(&mut self) {
        self.order_by = None;
    }

    /// Set LIMIT, rejecting zero
    pub fn set_limit(&mut self, n: u32) -> QueryResult<()> {
        let limit = NonZeroU32::new(n).ok_or_else(|| {
            QueryError::InvalidLimit("LIMIT must be a positive integer".to_string())
        })?;
        self.limit = Some(limit);
        Ok(())
    }

    pub fn clear_limit(&mut self) {
        self.limit = None;
    }

    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = window;
    }

    /// Drop every selection, including the table
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Name of the first required field that is missing
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.table.is_none() {
            Some("table")
        } else if self.columns.iter().all(|c| c.trim().is_empty()) {
            Some("columns")
        } else {
            None
        }
    }
}

fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(|s| s.into().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn push_non_blank(list: &mut Vec<String>, value: String) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    list.push(value.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_str() {
        assert_eq!("events".parse::<Table>().unwrap(), Table::Events);
        assert_eq!("FLOWS".parse::<Table>().unwrap(), Table::Flows);
        assert_eq!(
            "assets".parse::<Table>(),
            Err(QueryError::UnknownTable("assets".to_string()))
        );
    }

    #[test]
    fn test_time_unit_accepts_singular() {
        assert_eq!("hour".parse::<TimeUnit>().unwrap(), TimeUnit::Hours);
        assert_eq!("DAYS".parse::<TimeUnit>().unwrap(), TimeUnit::Days);
        assert!("weeks".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_relative_clause() {
        let window = TimeWindow::last(7, TimeUnit::Days);
        assert_eq!(window.clause().as_deref(), Some("LAST 7 DAYS"));
    }

    #[test]
    fn test_absolute_clause_with_and_without_stop() {
        let both = TimeWindow::absolute("2024-01-01 00:00", Some("2024-01-02 00:00".into())).unwrap();
        assert_eq!(
            both.clause().as_deref(),
            Some("START '2024-01-01 00:00' STOP '2024-01-02 00:00'")
        );

        let start_only = TimeWindow::absolute("2024-01-01 09:00:00", Some("  ".into())).unwrap();
        assert_eq!(start_only.clause().as_deref(), Some("START '2024-01-01 09:00:00'"));
    }

    #[test]
    fn test_invalid_window_renders_no_clause() {
        assert_eq!(TimeWindow::last(0, TimeUnit::Hours).clause(), None);

        let quoted = TimeWindow::Absolute {
            start: "x'y".to_string(),
            stop: None,
        };
        assert_eq!(quoted.clause(), None);

        let bad_stop = TimeWindow::Absolute {
            start: "2024-01-01 00:00".to_string(),
            stop: Some("2024-01-02' OR '1".to_string()),
        };
        assert_eq!(bad_stop.clause(), None);
    }

    #[test]
    fn test_absolute_rejects_bad_datetime() {
        let err = TimeWindow::absolute("yesterday", None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidTimeWindow(_)));
        assert!(TimeWindow::absolute("", None).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut draft = QueryDraft::new(Table::Events);
        assert!(draft.set_limit(0).is_err());
        assert!(draft.limit.is_none());
        draft.set_limit(25).unwrap();
        assert_eq!(draft.limit.map(|l| l.get()), Some(25));
    }

    #[test]
    fn test_blank_conditions_ignored() {
        let mut draft = QueryDraft::new(Table::Events);
        assert!(!draft.add_condition("   "));
        assert!(draft.add_condition(" magnitude > 5 "));
        assert_eq!(draft.conditions, vec!["magnitude > 5"]);
        assert_eq!(draft.remove_condition(3), None);
        assert_eq!(draft.remove_condition(0).as_deref(), Some("magnitude > 5"));
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(QueryDraft::default().missing_field(), Some("table"));
        assert_eq!(QueryDraft::new(Table::Flows).missing_field(), Some("columns"));
        let draft = QueryDraft::new(Table::Flows).select(&["sourceip"]);
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn test_chained_builders_drop_blank_columns() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["", " sourceip ", "  "])
            .group_by(&["sourceip", ""]);
        assert_eq!(draft.columns, vec!["sourceip"]);
        assert_eq!(draft.group_by, vec!["sourceip"]);

        let blank = QueryDraft::new(Table::Events).select(&["", " "]);
        assert_eq!(blank.missing_field(), Some("columns"));
    }

    #[test]
    fn test_empty_order_by_clears() {
        let mut draft = QueryDraft::new(Table::Events).order_by(&["magnitude"], SortDirection::Asc);
        assert!(draft.order_by.is_some());
        draft.set_order_by(vec![" ".to_string()], SortDirection::Desc);
        assert!(draft.order_by.is_none());
    }

    #[test]
    fn test_draft_deserializes_from_json() {
        let draft: QueryDraft = serde_json::from_str(
            r#"{
                "table": "flows",
                "columns": ["sourceip"],
                "order_by": {"columns": ["sourceip"], "direction": "asc"},
                "limit": 5,
                "time_window": {"kind": "relative", "amount": 1, "unit": "HOURS"}
            }"#,
        )
        .unwrap();

        assert_eq!(draft.table, Some(Table::Flows));
        assert_eq!(draft.order_by.unwrap().direction, SortDirection::Asc);
        assert_eq!(draft.time_window, TimeWindow::last(1, TimeUnit::Hours));
    }

    #[test]
    fn test_zero_limit_rejected_by_serde() {
        let result: Result<QueryDraft, _> =
            serde_json::from_str(r#"{"table": "events", "columns": ["*"], "limit": 0}"#);
        assert!(result.is_err());
    }
}
