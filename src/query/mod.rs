//! AQL Query Construction
//!
//! Everything needed to go from user selections to an AQL query string:
//!
//! - **Draft**: the in-progress clause selections ([`QueryDraft`])
//! - **Assembler**: joins a draft into a query in fixed clause order
//! - **Conditions**: helpers for common WHERE predicates
//! - **Time**: parser for `LAST` / `START ... STOP` clauses
//!
//! # Example
//!
//! ```rust
//! use aql_builder::query::{assemble, conditions, QueryDraft, Table, TimeWindow};
//!
//! let draft = QueryDraft::new(Table::Events)
//!     .select(&["sourceip", "username"])
//!     .filter(conditions::source_ip("10.0.0.0/8"))
//!     .time_window(TimeWindow::parse("LAST 1 HOURS").unwrap());
//!
//! let query = assemble(&draft).unwrap();
//! assert!(query.starts_with("SELECT sourceip, username FROM events WHERE INCIDR"));
//! ```

mod assembler;
pub mod conditions;
mod draft;
mod error;
mod time;

pub use assembler::{assemble, assemble_multiline, clauses};
pub use draft::{OrderBy, QueryDraft, SortDirection, Table, TimeUnit, TimeWindow};
pub use error::{QueryError, QueryResult};
pub use time::parse_time_window;
