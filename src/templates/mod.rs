//! Query Template Library
//!
//! Ready-made AQL queries grouped by category. Template queries may carry
//! `{{NAME}}` placeholders that are filled by plain text substitution; the
//! library does not quote or escape the substituted values.
//!
//! # Example
//!
//! ```rust
//! use aql_builder::templates;
//! use aql_builder::query::{TimeUnit, TimeWindow};
//!
//! let template = templates::get_template("activity by ip address").unwrap();
//! let query = template.render([("ip_address", "10.1.2.3")]);
//! let query = templates::with_time_window(&query, &TimeWindow::last(1, TimeUnit::Hours));
//!
//! assert!(query.contains("sourceip = '10.1.2.3'"));
//! assert!(query.ends_with("LAST 1 HOURS"));
//! ```

mod library;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::query::TimeWindow;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern"));

static TIME_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bLAST\s+\d+\s+(?:MINUTES|HOURS|DAYS)\b|\bSTART\s+'[^']*'(?:\s+STOP\s+'[^']*')?")
        .expect("time clause pattern")
});

/// A named, categorized query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    /// Query text, possibly containing `{{NAME}}` placeholders
    pub query: &'static str,
    /// Customizable parameters, lower-case
    pub params: &'static [&'static str],
}

impl TemplateEntry {
    /// Placeholder names in the query
    pub fn placeholders(&self) -> Vec<String> {
        placeholders(self.query)
    }

    /// Fill placeholders from `(name, value)` pairs
    ///
    /// Names match case-insensitively, so `ip_address` fills
    /// `{{IP_ADDRESS}}`. Unknown names are ignored and placeholders without
    /// a value stay in the text.
    pub fn render<I, K, V>(&self, values: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        fill_placeholders(self.query, values)
    }
}

/// Distinct `{{NAME}}` placeholders in order of first appearance
pub fn placeholders(query: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(query) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Plain find-and-replace of `{{NAME}}` tokens
pub fn fill_placeholders<I, K, V>(query: &str, values: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = query.to_string();
    for (key, value) in values {
        let token = format!("{{{{{}}}}}", key.as_ref().trim().to_ascii_uppercase());
        out = out.replace(&token, value.as_ref());
    }
    out
}

/// Swap the query's time clause for `window`
///
/// Existing `LAST n UNIT` or `START ... [STOP ...]` clauses are replaced;
/// a query without one gets the clause appended on its own line.
/// [`TimeWindow::None`] leaves the query as is.
pub fn with_time_window(query: &str, window: &TimeWindow) -> String {
    let Some(clause) = window.clause() else {
        return query.to_string();
    };

    if TIME_CLAUSE.is_match(query) {
        TIME_CLAUSE
            .replace_all(query, regex::NoExpand(&clause))
            .into_owned()
    } else {
        format!("{}\n{}", query.trim_end(), clause)
    }
}

/// Category names in display order
pub fn list_categories() -> &'static [&'static str] {
    &library::CATEGORY_NAMES
}

/// Templates of one category; unknown categories yield nothing
pub fn list_templates(category: &str) -> Vec<&'static TemplateEntry> {
    library::TEMPLATES
        .iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category.trim()))
        .collect()
}

/// Every template, grouped by category
pub fn all_templates() -> &'static [TemplateEntry] {
    library::TEMPLATES
}

/// Look up a template by name, ignoring case
pub fn get_template(name: &str) -> Option<&'static TemplateEntry> {
    let name = name.trim();
    library::TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Templates whose name or description contains `keyword`, ignoring case
pub fn search_templates(keyword: &str) -> Vec<(&'static str, &'static TemplateEntry)> {
    let keyword = keyword.trim().to_lowercase();
    library::TEMPLATES
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&keyword)
                || t.description.to_lowercase().contains(&keyword)
        })
        .map(|t| (t.category, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TimeUnit;
    use std::collections::HashSet;

    #[test]
    fn test_library_shape() {
        assert_eq!(list_categories().len(), 6);
        assert_eq!(all_templates().len(), 26);

        let total: usize = list_categories()
            .iter()
            .map(|c| list_templates(c).len())
            .sum();
        assert_eq!(total, 26);
    }

    #[test]
    fn test_template_names_unique() {
        let names: HashSet<_> = all_templates()
            .iter()
            .map(|t| t.name.to_lowercase())
            .collect();
        assert_eq!(names.len(), all_templates().len());
    }

    #[test]
    fn test_unknown_category_is_empty() {
        assert!(list_templates("Cloud").is_empty());
    }

    #[test]
    fn test_get_template_case_insensitive() {
        let t = get_template("ssh CONNECTIONS").unwrap();
        assert_eq!(t.name, "SSH Connections");
        assert_eq!(t.category, "Network & Traffic");
        assert!(get_template("nope").is_none());
    }

    #[test]
    fn test_search_matches_description() {
        let hits = search_templates("EXFILTRATION");
        let names: Vec<_> = hits.iter().map(|(_, t)| t.name).collect();
        assert_eq!(names, vec!["Large Data Transfers", "Potential DNS Tunneling"]);
        assert_eq!(hits[0].0, "Network & Traffic");
    }

    #[test]
    fn test_placeholders_in_order() {
        let t = get_template("Connections Between Two IPs").unwrap();
        assert_eq!(t.placeholders(), vec!["SOURCE_IP", "DEST_IP"]);
        assert!(get_template("SSH Connections")
            .unwrap()
            .placeholders()
            .is_empty());
    }

    #[test]
    fn test_render_fills_and_ignores() {
        let t = get_template("Connections Between Two IPs").unwrap();
        let query = t.render([("source_ip", "10.0.0.1"), ("unused", "x")]);

        assert!(query.contains("sourceip = '10.0.0.1' AND destinationip = '{{DEST_IP}}'"));
        assert!(!query.contains("{{SOURCE_IP}}"));
        assert_eq!(placeholders(&query), vec!["DEST_IP"]);
    }

    #[test]
    fn test_with_time_window_replaces_last() {
        let query = "SELECT * FROM events\nLAST 24 HOURS";
        assert_eq!(
            with_time_window(query, &TimeWindow::last(7, TimeUnit::Days)),
            "SELECT * FROM events\nLAST 7 DAYS"
        );
    }

    #[test]
    fn test_with_time_window_appends() {
        let t = get_template("Events in Offense").unwrap();
        let query = with_time_window(t.query, &TimeWindow::last(30, TimeUnit::Days));
        assert!(query.ends_with("ORDER BY starttime ASC\nLAST 30 DAYS"));
    }

    #[test]
    fn test_with_time_window_absolute_and_none() {
        let query = "SELECT * FROM events LAST 1 HOURS";
        let window = TimeWindow::absolute("2024-01-01 00:00", None).unwrap();
        assert_eq!(
            with_time_window(query, &window),
            "SELECT * FROM events START '2024-01-01 00:00'"
        );
        assert_eq!(with_time_window(query, &TimeWindow::None), query);
    }
}
