//! AQL Reference Catalog
//!
//! Static reference data for the fields, functions, operators and time
//! clauses of the QRadar Ariel Query Language. The tables are compiled into
//! the binary and never change at runtime, so every accessor hands out
//! `'static` slices and concurrent readers need no locking.
//!
//! Lookups are lenient: an unknown category yields an empty list rather
//! than an error.
//!
//! # Example
//!
//! ```rust
//! use aql_builder::catalog;
//! use aql_builder::query::Table;
//!
//! let fields = catalog::list_fields(Table::Flows);
//! assert!(fields.iter().any(|f| f.name == "sourcebytes"));
//!
//! assert!(catalog::is_known_function("logsourcename"));
//! assert!(catalog::list_functions("no-such-category").is_empty());
//! ```

mod fields;
mod functions;
mod operators;

pub use fields::{field_groups, list_fields, FieldGroup};
pub use functions::{
    aggregate_functions, all_functions, function_categories, is_known_function, list_functions,
    FunctionCategory,
};
pub use operators::{
    list_operators, list_time_clauses, operators_in, OperatorGroup, TimeClauseEntry,
};

use serde::Serialize;

/// One reference entry: a field, function or operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    /// Field, function or operator name
    pub name: &'static str,
    /// Human description
    pub description: &'static str,
    /// Usage example (function call syntax, operator usage)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
    /// AQL data type, for fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<&'static str>,
}

impl FieldEntry {
    /// Table column with its data type
    pub(crate) const fn field(
        name: &'static str,
        data_type: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            example: None,
            data_type: Some(data_type),
        }
    }

    /// Function or operator with a usage example
    pub(crate) const fn with_example(
        name: &'static str,
        example: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            example: Some(example),
            data_type: None,
        }
    }

    /// Entry with a description only
    pub(crate) const fn plain(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            example: None,
            data_type: None,
        }
    }
}
