//! Operators and time clauses

use std::str::FromStr;

use serde::Serialize;

use super::FieldEntry;

/// Operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorGroup {
    Comparison,
    String,
    Logical,
}

impl OperatorGroup {
    pub const ALL: [OperatorGroup; 3] = [
        OperatorGroup::Comparison,
        OperatorGroup::String,
        OperatorGroup::Logical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorGroup::Comparison => "comparison",
            OperatorGroup::String => "string",
            OperatorGroup::Logical => "logical",
        }
    }
}

impl FromStr for OperatorGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

const COMPARISON: &[FieldEntry] = &[
    FieldEntry::with_example("=", "sourceip = '192.168.1.1'", "Equal to"),
    FieldEntry::plain("!=", "Not equal to"),
    FieldEntry::plain("<>", "Not equal to (alternate)"),
    FieldEntry::plain("<", "Less than"),
    FieldEntry::plain(">", "Greater than"),
    FieldEntry::plain("<=", "Less than or equal to"),
    FieldEntry::with_example(">=", "magnitude >= 7 AND severity > 5", "Greater than or equal to"),
    FieldEntry::with_example(
        "BETWEEN",
        "eventcount BETWEEN 10 AND 100",
        "Between two values. Syntax: field BETWEEN value1 AND value2",
    ),
    FieldEntry::with_example(
        "IN",
        "sourceport IN (22, 23, 3389)",
        "In a list of values. Syntax: field IN (value1, value2, ...)",
    ),
    FieldEntry::plain("IS NULL", "Is null value"),
    FieldEntry::with_example("IS NOT NULL", "username IS NOT NULL", "Is not null value"),
];

const STRING: &[FieldEntry] = &[
    FieldEntry::with_example(
        "LIKE",
        "username LIKE 'admin%'",
        "Pattern matching (case-sensitive). Wildcards: % (any chars), _ (single char)",
    ),
    FieldEntry::with_example(
        "ILIKE",
        "payload ILIKE '%error%'",
        "Pattern matching (case-insensitive). Same wildcards as LIKE",
    ),
    FieldEntry::with_example(
        "MATCHES",
        r"sourceip MATCHES '192\.168\..*'",
        "Regular expression matching (case-sensitive)",
    ),
    FieldEntry::plain("IMATCHES", "Regular expression matching (case-insensitive)"),
];

const LOGICAL: &[FieldEntry] = &[
    FieldEntry::plain("AND", "Both conditions must be true"),
    FieldEntry::plain("OR", "Either condition must be true"),
    FieldEntry::plain("NOT", "Negates the condition"),
];

/// Operators of one group
pub fn operators_in(group: OperatorGroup) -> &'static [FieldEntry] {
    match group {
        OperatorGroup::Comparison => COMPARISON,
        OperatorGroup::String => STRING,
        OperatorGroup::Logical => LOGICAL,
    }
}

/// All operators: comparison, then string, then logical
pub fn list_operators() -> Vec<FieldEntry> {
    OperatorGroup::ALL
        .into_iter()
        .flat_map(|g| operators_in(g).iter().copied())
        .collect()
}

/// Example time clause
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimeClauseEntry {
    /// `LAST`, `START/STOP` or `PARSEDATETIME`
    pub kind: &'static str,
    pub example: &'static str,
    pub description: &'static str,
}

const TIME_CLAUSES: &[TimeClauseEntry] = &[
    TimeClauseEntry { kind: "LAST", example: "LAST 5 MINUTES", description: "Last 5 minutes" },
    TimeClauseEntry { kind: "LAST", example: "LAST 1 HOURS", description: "Last 1 hour" },
    TimeClauseEntry { kind: "LAST", example: "LAST 24 HOURS", description: "Last 24 hours" },
    TimeClauseEntry { kind: "LAST", example: "LAST 7 DAYS", description: "Last 7 days" },
    TimeClauseEntry { kind: "LAST", example: "LAST 30 DAYS", description: "Last 30 days" },
    TimeClauseEntry {
        kind: "START/STOP",
        example: "START '2024-01-01 00:00' STOP '2024-01-02 00:00'",
        description: "Specific date range",
    },
    TimeClauseEntry {
        kind: "START/STOP",
        example: "START '2024-01-01 09:00:00' STOP '2024-01-01 17:00:00'",
        description: "Specific time range",
    },
    TimeClauseEntry {
        kind: "PARSEDATETIME",
        example: "START PARSEDATETIME('1 hour ago') STOP PARSEDATETIME('now')",
        description: "Dynamic time range",
    },
    TimeClauseEntry {
        kind: "PARSEDATETIME",
        example: "START PARSEDATETIME('1 day ago')",
        description: "From 1 day ago to now",
    },
];

pub fn list_time_clauses() -> &'static [TimeClauseEntry] {
    TIME_CLAUSES
}
