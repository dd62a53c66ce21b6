//! Condition helpers
//!
//! Builders for the WHERE predicates offered by the quick-add menu. Values
//! are inserted as typed; quoting inside a value is the caller's concern.

use crate::query::error::{QueryError, QueryResult};

/// Comparison operators accepted by [`magnitude`]
pub const NUMERIC_OPERATORS: [&str; 6] = ["=", "!=", "<", ">", "<=", ">="];

/// Source IP equality, or an `INCIDR` check when given a CIDR range
pub fn source_ip(ip: &str) -> String {
    ip_condition("sourceip", ip)
}

/// Destination IP equality, or an `INCIDR` check when given a CIDR range
pub fn destination_ip(ip: &str) -> String {
    ip_condition("destinationip", ip)
}

fn ip_condition(field: &str, ip: &str) -> String {
    let ip = ip.trim();
    if ip.contains('/') {
        format!("INCIDR('{}', {})", ip, field)
    } else {
        format!("{} = '{}'", field, ip)
    }
}

/// Username match; `%` in the pattern switches to ILIKE
pub fn username(pattern: &str) -> String {
    let pattern = pattern.trim();
    if pattern.contains('%') {
        format!("username ILIKE '{}'", pattern)
    } else {
        format!("username = '{}'", pattern)
    }
}

/// Magnitude comparison, magnitude being on a 1-10 scale
pub fn magnitude(op: &str, value: u8) -> QueryResult<String> {
    let op = op.trim();
    if !NUMERIC_OPERATORS.contains(&op) {
        return Err(QueryError::InvalidCondition(format!(
            "operator '{}' is not one of {}",
            op,
            NUMERIC_OPERATORS.join(" ")
        )));
    }
    if !(1..=10).contains(&value) {
        return Err(QueryError::InvalidCondition(format!(
            "magnitude must be between 1 and 10, got {}",
            value
        )));
    }
    Ok(format!("magnitude {} {}", op, value))
}

/// Log source name containing `name`
pub fn log_source(name: &str) -> String {
    format!("LOGSOURCENAME(logsourceid) ILIKE '%{}%'", name.trim())
}

/// Event (QID) name containing `name`
pub fn event_name(name: &str) -> String {
    format!("QIDNAME(qid) ILIKE '%{}%'", name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_conditions() {
        assert_eq!(source_ip("192.168.1.1"), "sourceip = '192.168.1.1'");
        assert_eq!(
            destination_ip(" 10.0.0.0/8 "),
            "INCIDR('10.0.0.0/8', destinationip)"
        );
    }

    #[test]
    fn test_username_wildcard_switches_to_ilike() {
        assert_eq!(username("admin"), "username = 'admin'");
        assert_eq!(username("%admin%"), "username ILIKE '%admin%'");
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(">=", 7).unwrap(), "magnitude >= 7");
        assert!(magnitude("==", 7).is_err());
        assert!(magnitude(">", 11).is_err());
        assert!(magnitude(">", 0).is_err());
    }

    #[test]
    fn test_name_patterns() {
        assert_eq!(
            log_source("Windows"),
            "LOGSOURCENAME(logsourceid) ILIKE '%Windows%'"
        );
        assert_eq!(event_name("login"), "QIDNAME(qid) ILIKE '%login%'");
    }
}
