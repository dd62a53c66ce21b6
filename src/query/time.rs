//! Time Clause Parser
//!
//! Parses the trailing time clause of an AQL query into a [`TimeWindow`].
//!
//! # Supported Syntax
//!
//! ```text
//! LAST <n> MINUTES|HOURS|DAYS
//! <n> MINUTES|HOURS|DAYS
//! START '<datetime>' [STOP '<datetime>']
//! ```
//!
//! An empty string parses to [`TimeWindow::None`].

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while},
    character::complete::{alpha1, char, digit1, multispace0, multispace1},
    combinator::{map, opt},
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::query::draft::{TimeUnit, TimeWindow};
use crate::query::error::{QueryError, QueryResult};

/// Clause recognized before unit and datetime checks
enum RawWindow<'a> {
    Relative { amount: &'a str, unit: &'a str },
    Absolute { start: String, stop: Option<String> },
}

/// Parse a time clause string into a [`TimeWindow`]
pub fn parse_time_window(input: &str) -> QueryResult<TimeWindow> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(TimeWindow::None);
    }

    let raw = match parse_window(input) {
        Ok((remaining, raw)) if remaining.trim().is_empty() => raw,
        Ok((remaining, _)) => {
            return Err(QueryError::InvalidTimeWindow(format!(
                "Unexpected input after time clause: '{}'",
                remaining.trim()
            )))
        }
        Err(_) => {
            return Err(QueryError::InvalidTimeWindow(format!(
                "'{}' is not a LAST or START/STOP clause",
                input
            )))
        }
    };

    match raw {
        RawWindow::Relative { amount, unit } => {
            let amount: u32 = amount.parse().map_err(|_| {
                QueryError::InvalidTimeWindow(format!("'{}' is not a valid amount", amount))
            })?;
            let unit: TimeUnit = unit.parse()?;
            let window = TimeWindow::last(amount, unit);
            window.validate()?;
            Ok(window)
        }
        RawWindow::Absolute { start, stop } => TimeWindow::absolute(start, stop),
    }
}

fn parse_window(input: &str) -> IResult<&str, RawWindow<'_>> {
    alt((parse_absolute, parse_relative))(input)
}

/// `[LAST] <n> <unit>`
fn parse_relative(input: &str) -> IResult<&str, RawWindow<'_>> {
    let (input, _) = opt(terminated(tag_no_case("LAST"), multispace1))(input)?;
    let (input, amount) = digit1(input)?;
    let (input, _) = multispace1(input)?;
    let (input, unit) = alpha1(input)?;
    Ok((input, RawWindow::Relative { amount, unit }))
}

/// `START '<a>' [STOP '<b>']`
fn parse_absolute(input: &str) -> IResult<&str, RawWindow<'_>> {
    let (input, _) = tag_no_case("START")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, start) = parse_quoted_string(input)?;
    let (input, stop) = opt(preceded(
        pair(multispace1, tag_no_case("STOP")),
        preceded(multispace0, parse_quoted_string),
    ))(input)?;
    Ok((input, RawWindow::Absolute { start, stop }))
}

fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    map(
        terminated(preceded(char('\''), take_while(|c| c != '\'')), char('\'')),
        |s: &str| s.to_string(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_clause() {
        assert_eq!(
            parse_time_window("LAST 24 HOURS").unwrap(),
            TimeWindow::last(24, TimeUnit::Hours)
        );
    }

    #[test]
    fn test_parse_without_last_keyword() {
        assert_eq!(
            parse_time_window("7 days").unwrap(),
            TimeWindow::last(7, TimeUnit::Days)
        );
    }

    #[test]
    fn test_parse_case_insensitive_singular() {
        assert_eq!(
            parse_time_window("last 1 hour").unwrap(),
            TimeWindow::last(1, TimeUnit::Hours)
        );
    }

    #[test]
    fn test_parse_start_stop() {
        let window =
            parse_time_window("START '2024-01-01 00:00' STOP '2024-01-02 00:00'").unwrap();
        assert_eq!(
            window,
            TimeWindow::Absolute {
                start: "2024-01-01 00:00".to_string(),
                stop: Some("2024-01-02 00:00".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_start_only() {
        let window = parse_time_window("START '2024-01-01 09:00:00'").unwrap();
        assert_eq!(window.clause().as_deref(), Some("START '2024-01-01 09:00:00'"));
    }

    #[test]
    fn test_parse_empty_is_none() {
        assert_eq!(parse_time_window("   ").unwrap(), TimeWindow::None);
    }

    #[test]
    fn test_parse_unknown_unit() {
        assert_eq!(
            parse_time_window("LAST 2 WEEKS"),
            Err(QueryError::UnknownTimeUnit("WEEKS".to_string()))
        );
    }

    #[test]
    fn test_parse_zero_amount() {
        assert!(matches!(
            parse_time_window("LAST 0 DAYS"),
            Err(QueryError::InvalidTimeWindow(_))
        ));
    }

    #[test]
    fn test_parse_trailing_garbage() {
        assert!(parse_time_window("LAST 5 MINUTES please").is_err());
        assert!(parse_time_window("yesterday").is_err());
    }

    #[test]
    fn test_parse_bad_datetime() {
        assert!(matches!(
            parse_time_window("START 'tomorrow'"),
            Err(QueryError::InvalidTimeWindow(_))
        ));
    }
}
