//! Query error types
//!
//! Defines the error conditions that can occur while editing or assembling a draft.

use thiserror::Error;

/// Errors that can occur during query construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required part of the draft is missing (`table` or `columns`)
    #[error("Incomplete draft: {field} must be set before the query can be assembled")]
    IncompleteDraft { field: &'static str },

    /// LIMIT must be a positive integer
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    /// Time window could not be parsed or has malformed datetimes
    #[error("Invalid time window: {0}")]
    InvalidTimeWindow(String),

    /// Table other than `events` or `flows`
    #[error("Unknown table '{0}'. Use 'events' or 'flows'")]
    UnknownTable(String),

    /// Time unit other than MINUTES, HOURS or DAYS
    #[error("Unknown time unit '{0}'. Use MINUTES, HOURS or DAYS")]
    UnknownTimeUnit(String),

    /// Condition helper received an unusable value
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
