//! # AQL Builder
//!
//! Query construction helper for the QRadar Ariel Query Language (AQL).
//! Builds queries from clause selections, fills parameterized templates and
//! flags likely mistakes in hand-written query text. Queries are never
//! executed.
//!
//! ## Modules
//!
//! - [`catalog`]: Static reference data (fields, functions, operators, time clauses)
//! - [`templates`]: Categorized, parameterized query templates
//! - [`query`]: Query drafts, assembly and time-window parsing
//! - [`validator`]: Heuristic checks producing findings
//! - [`session`]: Interactive terminal front end
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust
//! use aql_builder::query::{assemble, QueryDraft, SortDirection, Table, TimeUnit, TimeWindow};
//! use aql_builder::validator::validate;
//!
//! let draft = QueryDraft::new(Table::Events)
//!     .select(&["sourceip", "COUNT(*) AS hits"])
//!     .filter("magnitude >= 7")
//!     .group_by(&["sourceip"])
//!     .order_by(&["hits"], SortDirection::Desc)
//!     .limit(10)
//!     .time_window(TimeWindow::last(24, TimeUnit::Hours));
//!
//! let query = assemble(&draft).unwrap();
//! assert_eq!(
//!     query,
//!     "SELECT sourceip, COUNT(*) AS hits FROM events WHERE magnitude >= 7 \
//!      GROUP BY sourceip ORDER BY hits DESC LIMIT 10 LAST 24 HOURS"
//! );
//! assert!(validate(&query).is_empty());
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod query;
pub mod session;
pub mod templates;
pub mod validator;

// Re-export top-level types for convenience
pub use catalog::{FieldEntry, OperatorGroup};

pub use query::{
    assemble, assemble_multiline, QueryDraft, QueryError, QueryResult, SortDirection, Table,
    TimeUnit, TimeWindow,
};

pub use templates::TemplateEntry;

pub use validator::{validate, Finding, Severity, ValidationReport, Validator};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::Config;

pub use session::Session;
