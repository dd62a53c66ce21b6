//! Validation checks
//!
//! Every check takes the raw query text and returns its findings. Checks
//! are independent of each other; none of them assumes another has run.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Check, Finding};
use crate::catalog;

/// The default checks, in reporting order
pub const DEFAULT_CHECKS: [Check; 18] = [
    empty_query,
    leading_select,
    from_clause,
    balanced_quotes,
    balanced_parentheses,
    comparison_operators,
    wildcard_with_equals,
    like_without_wildcard,
    match_all_patterns,
    empty_conditions,
    whitespace_and_terminator,
    common_typos,
    unknown_functions,
    double_quoted_literals,
    time_clause,
    clause_order,
    limit_value,
    aggregation_usage,
];

#[cfg(test)]
pub(super) const CHECK_NAMES: [&str; 18] = [
    "empty_query",
    "leading_select",
    "from_clause",
    "balanced_quotes",
    "balanced_parentheses",
    "comparison_operators",
    "wildcard_with_equals",
    "like_without_wildcard",
    "match_all_patterns",
    "empty_conditions",
    "whitespace_and_terminator",
    "common_typos",
    "unknown_functions",
    "double_quoted_literals",
    "time_clause",
    "clause_order",
    "limit_value",
    "aggregation_usage",
];

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).expect($pattern));
    };
}

regex!(SELECT_RE, r"\bSELECT\b");
regex!(FROM_RE, r"\bFROM\b(?:\s+([A-Z_][A-Z0-9_]*))?");
regex!(BAD_COMPARISON_RE, r"===|!==|==|=>|=<|=!");
regex!(EQUALS_LITERAL_RE, r"(?:^|[^<>!=])(!=|<>|=)\s*'([^']*)'");
regex!(LIKE_LITERAL_RE, r"(?i)\b(I?LIKE)\s+'([^']*)'");
regex!(LIKE_ALL_RE, r"(?i)\b(I?LIKE)\s+'%+'");
regex!(MATCHES_ALL_RE, r"(?i)\b(I?MATCHES)\s+'\.\*'");
regex!(SELECT_STAR_RE, r"\bSELECT\s+\*");
regex!(LIMIT_RE, r"\bLIMIT\b(?:\s+([^\s]+))?");
regex!(
    EMPTY_WHERE_RE,
    r"\bWHERE\s*(?:$|GROUP\s+BY\b|HAVING\b|ORDER\s+BY\b|LIMIT\b|LAST\s+\d|START\b)"
);
regex!(
    EMPTY_HAVING_RE,
    r"\bHAVING\s*(?:$|ORDER\s+BY\b|LIMIT\b|LAST\s+\d|START\b)"
);
regex!(DOUBLED_CONNECTIVE_RE, r"\b(AND|OR)\s+(AND|OR)\b");
regex!(LEADING_CONNECTIVE_RE, r"\b(?:WHERE|HAVING)\s+(AND|OR)\b");
regex!(
    TRAILING_CONNECTIVE_RE,
    r"\b(AND|OR)\s*(?:$|GROUP\s+BY\b|HAVING\b|ORDER\s+BY\b|LIMIT\b|LAST\s+\d|START\b)"
);
regex!(
    FUNCTION_CALL_RE,
    r"\b([A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*)?)\s*\("
);
regex!(
    DOUBLE_QUOTED_RE,
    r#"(?i)(?:!=|<>|<=|>=|=|<|>|\bI?LIKE\b|\bI?MATCHES\b)\s*""#
);
regex!(LAST_CLAUSE_RE, r"\bLAST\s+(\d+)\s+([A-Z]+)\b");
regex!(START_STOP_RE, r"\b(?:START|STOP)\b");
regex!(GROUP_BY_RE, r"\bGROUP\s+BY\b");
regex!(HAVING_RE, r"\bHAVING\b");
regex!(TYPO_RE, r"\b(FORM|FRMO|FOMR|SELCT|SELET|SLECT|SEELCT|SELEC|WHRE|WEHRE|WHER|WHEER|GROUPBY|GRUOP|GORUP|ORDERBY|ODRER|OREDR|LIMT|LIMTI|LMIT|HAIVNG|HAVNG|ILKE|LIEK|DESCENDING|ASCENDING)\b");

static AGGREGATE_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    let names: Vec<&str> = catalog::aggregate_functions().collect();
    let pattern = format!(r"\b(?:{})\s*\(", names.join("|"));
    Regex::new(&pattern).expect("aggregate call pattern")
});

/// Clause keywords in the order AQL requires them
static CLAUSES: Lazy<[(&str, Regex); 8]> = Lazy::new(|| {
    let re = |p: &str| Regex::new(p).expect("clause pattern");
    [
        ("SELECT", re(r"\bSELECT\b")),
        ("FROM", re(r"\bFROM\b")),
        ("WHERE", re(r"\bWHERE\b")),
        ("GROUP BY", re(r"\bGROUP\s+BY\b")),
        ("HAVING", re(r"\bHAVING\b")),
        ("ORDER BY", re(r"\bORDER\s+BY\b")),
        ("LIMIT", re(r"\bLIMIT\b")),
        ("the time clause", re(r"\bLAST\s+\d|\bSTART\b")),
    ]
});

/// Words followed by `(` that are not function calls
const NON_FUNCTION_WORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "AS", "ON", "HAVING", "BETWEEN",
    "LIKE", "ILIKE", "MATCHES", "IMATCHES", "IS", "NULL", "BY", "VALUES", "CASE", "WHEN",
    "THEN", "ELSE", "END", "EXISTS", "DISTINCT", "LIMIT", "START", "STOP",
];

const TYPO_FIXES: &[(&str, &str)] = &[
    ("FORM", "FROM"),
    ("FRMO", "FROM"),
    ("FOMR", "FROM"),
    ("SELCT", "SELECT"),
    ("SELET", "SELECT"),
    ("SLECT", "SELECT"),
    ("SEELCT", "SELECT"),
    ("SELEC", "SELECT"),
    ("WHRE", "WHERE"),
    ("WEHRE", "WHERE"),
    ("WHER", "WHERE"),
    ("WHEER", "WHERE"),
    ("GROUPBY", "GROUP BY"),
    ("GRUOP", "GROUP"),
    ("GORUP", "GROUP"),
    ("ORDERBY", "ORDER BY"),
    ("ODRER", "ORDER"),
    ("OREDR", "ORDER"),
    ("LIMT", "LIMIT"),
    ("LIMTI", "LIMIT"),
    ("LMIT", "LIMIT"),
    ("HAIVNG", "HAVING"),
    ("HAVNG", "HAVING"),
    ("ILKE", "ILIKE"),
    ("LIEK", "LIKE"),
    ("DESCENDING", "DESC"),
    ("ASCENDING", "ASC"),
];

const EXCERPT_RADIUS: usize = 12;

/// Blank the contents of single-quoted literals, keeping byte offsets
pub(super) fn mask_literals(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_literal = false;
    for c in query.chars() {
        if c == '\'' {
            in_literal = !in_literal;
            out.push(c);
        } else if in_literal {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    out
}

/// Masked and upper-cased copy for keyword matching
fn keywords(query: &str) -> String {
    mask_literals(query).to_ascii_uppercase()
}

/// Text around a byte offset, clamped to char boundaries
pub(super) fn excerpt(query: &str, position: usize) -> String {
    let mut start = position.saturating_sub(EXCERPT_RADIUS).min(query.len());
    while !query.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = position.saturating_add(EXCERPT_RADIUS).min(query.len());
    while !query.is_char_boundary(end) {
        end += 1;
    }
    query[start..end].trim().to_string()
}

fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

pub fn empty_query(query: &str) -> Vec<Finding> {
    if is_blank(query) {
        vec![Finding::error("empty_query", "Query is empty")]
    } else {
        Vec::new()
    }
}

pub fn leading_select(query: &str) -> Vec<Finding> {
    if is_blank(query) {
        return Vec::new();
    }
    let text = keywords(query);
    match SELECT_RE.find(&text) {
        None => vec![Finding::error(
            "leading_select",
            "Query is missing SELECT keyword",
        )],
        Some(m) if !text.trim_start().starts_with("SELECT") => {
            vec![Finding::error("leading_select", "Query should start with SELECT")
                .at(query, m.start())]
        }
        Some(_) => Vec::new(),
    }
}

pub fn from_clause(query: &str) -> Vec<Finding> {
    if is_blank(query) {
        return Vec::new();
    }
    let text = keywords(query);
    let Some(caps) = FROM_RE.captures(&text) else {
        return vec![Finding::error("from_clause", "Query is missing FROM clause")];
    };
    let from = caps.get(0).map(|m| m.start()).unwrap_or(0);

    match caps.get(1) {
        None => vec![
            Finding::error("from_clause", "FROM clause is missing a table name").at(query, from),
        ],
        Some(table) if !matches!(table.as_str(), "EVENTS" | "FLOWS") => {
            vec![Finding::error(
                "from_clause",
                format!(
                    "Unknown table '{}'. Use 'events' or 'flows'",
                    &query[table.range()]
                ),
            )
            .at(query, table.start())]
        }
        Some(_) => Vec::new(),
    }
}

pub fn balanced_quotes(query: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (quote, label) in [('\'', "single"), ('"', "double")] {
        let positions: Vec<usize> = query.match_indices(quote).map(|(i, _)| i).collect();
        if positions.len() % 2 != 0 {
            let last = positions[positions.len() - 1];
            findings.push(
                Finding::error(
                    "balanced_quotes",
                    format!("Unmatched {} quotes detected", label),
                )
                .at(query, last),
            );
        }
    }
    findings
}

pub fn balanced_parentheses(query: &str) -> Vec<Finding> {
    let text = mask_literals(query);
    let mut findings = Vec::new();
    let mut open = Vec::new();

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => open.push(i),
            b')' => {
                if open.pop().is_none() {
                    findings.push(
                        Finding::error("balanced_parentheses", "Unexpected closing parenthesis")
                            .at(query, i),
                    );
                }
            }
            _ => {}
        }
    }

    if let Some(&last) = open.last() {
        findings.push(
            Finding::error(
                "balanced_parentheses",
                format!("{} unclosed parenthesis", open.len()),
            )
            .at(query, last),
        );
    }
    findings
}

pub fn comparison_operators(query: &str) -> Vec<Finding> {
    let text = mask_literals(query);
    BAD_COMPARISON_RE
        .find_iter(&text)
        .map(|m| {
            let message = match m.as_str() {
                "==" | "===" => format!("Use single '=' for equality, not '{}'", m.as_str()),
                "!==" => "Use '!=' for inequality, not '!=='".to_string(),
                "=>" => "Use '>=' instead of '=>'".to_string(),
                "=<" => "Use '<=' instead of '=<'".to_string(),
                other => format!("Use '!=' instead of '{}'", other),
            };
            Finding::error("comparison_operators", message).at(query, m.start())
        })
        .collect()
}

pub fn wildcard_with_equals(query: &str) -> Vec<Finding> {
    EQUALS_LITERAL_RE
        .captures_iter(query)
        .filter(|caps| caps[2].contains('%'))
        .filter_map(|caps| caps.get(1))
        .map(|op| {
            Finding::warning(
                "wildcard_with_equals",
                format!(
                    "'%' is a wildcard only with LIKE/ILIKE; '{}' compares it literally",
                    op.as_str()
                ),
            )
            .at(query, op.start())
        })
        .collect()
}

pub fn like_without_wildcard(query: &str) -> Vec<Finding> {
    LIKE_LITERAL_RE
        .captures_iter(query)
        .filter(|caps| !caps[2].contains(['%', '_']))
        .filter_map(|caps| caps.get(0))
        .map(|m| {
            Finding::warning(
                "like_without_wildcard",
                "LIKE pattern has no % or _ wildcard; use '=' for an exact match",
            )
            .at(query, m.start())
        })
        .collect()
}

pub fn match_all_patterns(query: &str) -> Vec<Finding> {
    let mut findings: Vec<Finding> = LIKE_ALL_RE
        .find_iter(query)
        .chain(MATCHES_ALL_RE.find_iter(query))
        .map(|m| {
            Finding::warning(
                "match_all_patterns",
                format!("'{}' matches every value; the condition has no effect", m.as_str()),
            )
            .at(query, m.start())
        })
        .collect();
    findings.sort_by_key(|f| f.position);

    let text = keywords(query);
    if let Some(m) = SELECT_STAR_RE.find(&text) {
        if !LIMIT_RE.is_match(&text) {
            findings.push(
                Finding::suggestion(
                    "match_all_patterns",
                    "SELECT * without LIMIT can return very large result sets; consider adding LIMIT",
                )
                .at(query, m.start()),
            );
        }
    }
    findings
}

pub fn empty_conditions(query: &str) -> Vec<Finding> {
    let text = keywords(query);
    let mut findings = Vec::new();

    for m in EMPTY_WHERE_RE.find_iter(&text) {
        findings.push(
            Finding::warning("empty_conditions", "WHERE clause has no conditions")
                .at(query, m.start()),
        );
    }
    for m in EMPTY_HAVING_RE.find_iter(&text) {
        findings.push(
            Finding::warning("empty_conditions", "HAVING clause has no conditions")
                .at(query, m.start()),
        );
    }
    for caps in DOUBLED_CONNECTIVE_RE.captures_iter(&text) {
        findings.push(
            Finding::warning(
                "empty_conditions",
                format!("Empty condition between '{}' and '{}'", &caps[1], &caps[2]),
            )
            .at(query, caps.get(0).map(|m| m.start()).unwrap_or(0)),
        );
    }
    for caps in LEADING_CONNECTIVE_RE.captures_iter(&text) {
        if let Some(op) = caps.get(1) {
            findings.push(
                Finding::warning(
                    "empty_conditions",
                    format!("Condition list starts with a dangling '{}'", op.as_str()),
                )
                .at(query, op.start()),
            );
        }
    }
    for caps in TRAILING_CONNECTIVE_RE.captures_iter(&text) {
        if let Some(op) = caps.get(1) {
            findings.push(
                Finding::warning(
                    "empty_conditions",
                    format!("Condition list ends with a dangling '{}'", op.as_str()),
                )
                .at(query, op.start()),
            );
        }
    }

    findings.sort_by_key(|f| f.position);
    findings
}

pub fn whitespace_and_terminator(query: &str) -> Vec<Finding> {
    if is_blank(query) {
        return Vec::new();
    }
    let mut findings = Vec::new();

    if query.starts_with(char::is_whitespace) {
        findings.push(Finding::warning(
            "whitespace_and_terminator",
            "Query has leading whitespace",
        ));
    }
    if query.ends_with(char::is_whitespace) {
        findings.push(Finding::warning(
            "whitespace_and_terminator",
            "Query has trailing whitespace",
        ));
    }
    let trimmed = query.trim_end();
    if trimmed.ends_with(';') {
        findings.push(
            Finding::warning(
                "whitespace_and_terminator",
                "AQL does not use a ';' terminator; remove it",
            )
            .at(query, trimmed.len() - 1),
        );
    }
    findings
}

pub fn common_typos(query: &str) -> Vec<Finding> {
    let text = keywords(query);
    TYPO_RE
        .find_iter(&text)
        .filter_map(|m| {
            let fix = TYPO_FIXES
                .iter()
                .find(|(typo, _)| *typo == m.as_str())
                .map(|(_, fix)| *fix)?;
            Some(
                Finding::warning(
                    "common_typos",
                    format!(
                        "Possible typo '{}': did you mean '{}'?",
                        &query[m.range()],
                        fix
                    ),
                )
                .at(query, m.start()),
            )
        })
        .collect()
}

pub fn unknown_functions(query: &str) -> Vec<Finding> {
    let text = mask_literals(query);
    let mut seen = HashSet::new();
    let mut findings = Vec::new();

    for caps in FUNCTION_CALL_RE.captures_iter(&text) {
        let Some(name) = caps.get(1) else { continue };
        let upper = name.as_str().to_ascii_uppercase();
        if NON_FUNCTION_WORDS.contains(&upper.as_str()) || catalog::is_known_function(&upper) {
            continue;
        }
        if seen.insert(upper) {
            findings.push(
                Finding::suggestion(
                    "unknown_functions",
                    format!(
                        "Unknown function '{}'; check the function reference",
                        name.as_str()
                    ),
                )
                .at(query, name.start()),
            );
        }
    }
    findings
}

pub fn double_quoted_literals(query: &str) -> Vec<Finding> {
    let text = mask_literals(query);
    DOUBLE_QUOTED_RE
        .find_iter(&text)
        .map(|m| {
            Finding::warning(
                "double_quoted_literals",
                "Double quotes mark aliases; use single quotes for string values",
            )
            .at(query, m.end() - 1)
        })
        .collect()
}

pub fn time_clause(query: &str) -> Vec<Finding> {
    if is_blank(query) {
        return Vec::new();
    }
    let text = keywords(query);
    let mut findings = Vec::new();
    let mut has_time = START_STOP_RE.is_match(&text);

    for caps in LAST_CLAUSE_RE.captures_iter(&text) {
        has_time = true;
        let (Some(amount), Some(unit)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        if amount.as_str().bytes().all(|b| b == b'0') {
            findings.push(
                Finding::error("time_clause", "Time window amount must be positive")
                    .at(query, amount.start()),
            );
        }

        match unit.as_str() {
            "MINUTES" | "HOURS" | "DAYS" => {}
            "MINUTE" | "HOUR" | "DAY" => findings.push(
                Finding::warning(
                    "time_clause",
                    format!("Use the plural time unit '{}S'", unit.as_str()),
                )
                .at(query, unit.start()),
            ),
            other => findings.push(
                Finding::error(
                    "time_clause",
                    format!("Unknown time unit '{}'. Use MINUTES, HOURS or DAYS", other),
                )
                .at(query, unit.start()),
            ),
        }
    }

    if !has_time {
        findings.push(Finding::warning(
            "time_clause",
            "Consider adding a time clause (LAST, START/STOP)",
        ));
    }
    findings
}

pub fn clause_order(query: &str) -> Vec<Finding> {
    let text = keywords(query);
    let found: Vec<(&str, Option<usize>)> = CLAUSES
        .iter()
        .map(|(name, re)| (*name, re.find(&text).map(|m| m.start())))
        .collect();

    let mut findings = Vec::new();
    for (i, (earlier, earlier_pos)) in found.iter().enumerate() {
        let Some(earlier_pos) = earlier_pos else { continue };
        for (later, later_pos) in &found[i + 1..] {
            if let Some(later_pos) = later_pos {
                if later_pos < earlier_pos {
                    findings.push(
                        Finding::error(
                            "clause_order",
                            format!("{} should come before {}", earlier, later),
                        )
                        .at(query, *later_pos),
                    );
                }
            }
        }
    }
    findings
}

pub fn limit_value(query: &str) -> Vec<Finding> {
    let text = keywords(query);
    LIMIT_RE
        .captures_iter(&text)
        .filter_map(|caps| {
            let limit = caps.get(0)?;
            let value = caps.get(1).map(|v| query[v.range()].trim_end_matches(';'));
            let positive = value
                .and_then(|v| v.parse::<u64>().ok())
                .is_some_and(|n| n > 0);
            if positive {
                return None;
            }
            let message = match value {
                Some(v) if !v.is_empty() => {
                    format!("LIMIT value '{}' is not a positive integer", v)
                }
                _ => "LIMIT requires a positive integer".to_string(),
            };
            Some(Finding::error("limit_value", message).at(query, limit.start()))
        })
        .collect()
}

pub fn aggregation_usage(query: &str) -> Vec<Finding> {
    let text = keywords(query);
    let mut findings = Vec::new();
    let group_by = GROUP_BY_RE.find(&text);

    if let Some(m) = group_by {
        if !AGGREGATE_CALL_RE.is_match(&text) {
            findings.push(
                Finding::warning(
                    "aggregation_usage",
                    "GROUP BY is typically used with aggregate functions (COUNT, SUM, etc.)",
                )
                .at(query, m.start()),
            );
        }
    }
    if let Some(m) = HAVING_RE.find(&text) {
        if group_by.is_none() {
            findings.push(
                Finding::error("aggregation_usage", "HAVING requires a GROUP BY clause")
                    .at(query, m.start()),
            );
        }
    }
    findings
}
