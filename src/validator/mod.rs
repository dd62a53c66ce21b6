//! Query Validator
//!
//! Heuristic, non-parsing validation of AQL text. A fixed, ordered list of
//! independent checks runs over the input and each contributes zero or more
//! [`Finding`]s. Validation never fails and never rewrites the input.
//!
//! Checks that look for keywords run on a copy of the query where the
//! contents of single-quoted literals are blanked, so `'%from%'` never
//! counts as a FROM clause. Blanking keeps byte offsets, so positions in
//! findings always index into the original text.
//!
//! # Example
//!
//! ```rust
//! use aql_builder::validator::{validate, Severity};
//!
//! let findings = validate("SELECT * FORM events");
//! assert!(findings.iter().any(|f| f.severity == Severity::Error));
//! assert!(findings.iter().any(|f| f.check == "common_typos"));
//! ```

mod checks;

use serde::{Deserialize, Serialize};

pub use checks::DEFAULT_CHECKS;

/// Severity of a finding, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic produced by a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Name of the check that produced it
    pub check: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Byte offset into the validated text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Text around `position`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl Finding {
    pub fn new(check: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            position: None,
            excerpt: None,
        }
    }

    pub fn error(check: &'static str, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Error, message)
    }

    pub fn warning(check: &'static str, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Warning, message)
    }

    pub fn suggestion(check: &'static str, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Suggestion, message)
    }

    /// Attach a position and the surrounding text of `query`
    pub fn at(mut self, query: &str, position: usize) -> Self {
        self.position = Some(position);
        self.excerpt = Some(checks::excerpt(query, position));
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(pos) = self.position {
            write!(f, " (at {})", pos)?;
        }
        Ok(())
    }
}

/// A validation check
pub type Check = fn(&str) -> Vec<Finding>;

/// Findings of one validation run, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// No error-level findings
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn suggestion_count(&self) -> usize {
        self.count(Severity::Suggestion)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Runs an ordered list of checks
#[derive(Debug, Clone)]
pub struct Validator {
    checks: Vec<Check>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_checks(DEFAULT_CHECKS.to_vec())
    }
}

impl Validator {
    pub fn with_checks(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    pub fn validate(&self, query: &str) -> ValidationReport {
        let findings: Vec<Finding> = self.checks.iter().flat_map(|check| check(query)).collect();
        let report = ValidationReport { findings };

        tracing::debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            suggestions = report.suggestion_count(),
            "Validated query"
        );

        report
    }
}

/// Validate with the default checks
pub fn validate(query: &str) -> Vec<Finding> {
    Validator::default().validate(query).into_findings()
}
