//! Query Assembler
//!
//! Turns a [`QueryDraft`] into an AQL query string. Clauses are emitted in
//! the fixed AQL order and empty clauses are omitted:
//!
//! ```text
//! SELECT <columns>
//! FROM <table>
//! [WHERE <cond> AND <cond> ...]
//! [GROUP BY <columns>]
//! [HAVING <cond> AND ...]
//! [ORDER BY <columns> ASC|DESC]
//! [LIMIT <n>]
//! [LAST <n> <UNIT> | START '<datetime>' [STOP '<datetime>']]
//! ```
//!
//! Condition fragments are inserted verbatim; checking their syntax is the
//! validator's job.

use crate::query::draft::QueryDraft;
use crate::query::error::{QueryError, QueryResult};

/// Build the ordered list of clauses for a draft
pub fn clauses(draft: &QueryDraft) -> QueryResult<Vec<String>> {
    if let Some(field) = draft.missing_field() {
        return Err(QueryError::IncompleteDraft { field });
    }
    let table = draft
        .table
        .ok_or(QueryError::IncompleteDraft { field: "table" })?;

    let mut parts = Vec::with_capacity(8);

    parts.push(format!("SELECT {}", draft.columns.join(", ")));
    parts.push(format!("FROM {}", table));

    if !draft.conditions.is_empty() {
        parts.push(format!("WHERE {}", draft.conditions.join(" AND ")));
    }

    if !draft.group_by.is_empty() {
        parts.push(format!("GROUP BY {}", draft.group_by.join(", ")));
    }

    if !draft.having.is_empty() {
        parts.push(format!("HAVING {}", draft.having.join(" AND ")));
    }

    if let Some(order) = draft.order_by.as_ref().filter(|o| !o.columns.is_empty()) {
        parts.push(format!(
            "ORDER BY {} {}",
            order.columns.join(", "),
            order.direction
        ));
    }

    if let Some(limit) = draft.limit {
        parts.push(format!("LIMIT {}", limit));
    }

    if let Some(time) = draft.time_window.clause() {
        parts.push(time);
    }

    Ok(parts)
}

/// Assemble the draft into a single-line query
pub fn assemble(draft: &QueryDraft) -> QueryResult<String> {
    Ok(clauses(draft)?.join(" "))
}

/// Assemble the draft with one clause per line
pub fn assemble_multiline(draft: &QueryDraft) -> QueryResult<String> {
    Ok(clauses(draft)?.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::draft::{SortDirection, Table, TimeUnit, TimeWindow};

    #[test]
    fn test_assemble_simple() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["sourceip", "username"])
            .filter("username = 'admin'")
            .limit(10);

        assert_eq!(
            assemble(&draft).unwrap(),
            "SELECT sourceip, username FROM events WHERE username = 'admin' LIMIT 10"
        );
    }

    #[test]
    fn test_assemble_missing_columns() {
        let draft = QueryDraft::new(Table::Events);
        assert_eq!(
            assemble(&draft),
            Err(QueryError::IncompleteDraft { field: "columns" })
        );
    }

    #[test]
    fn test_assemble_missing_table() {
        let draft = QueryDraft::default().select(&["*"]);
        assert_eq!(
            assemble(&draft),
            Err(QueryError::IncompleteDraft { field: "table" })
        );
    }

    #[test]
    fn test_assemble_full_clause_order() {
        let draft = QueryDraft::new(Table::Flows)
            .select(&["sourceip", "SUM(sourcebytes) AS bytes"])
            .filter("destinationport = 22")
            .filter("sourcebytes > 1000")
            .group_by(&["sourceip"])
            .having("bytes > 5000")
            .order_by(&["bytes"], SortDirection::Desc)
            .limit(50)
            .time_window(TimeWindow::last(24, TimeUnit::Hours));

        assert_eq!(
            assemble(&draft).unwrap(),
            "SELECT sourceip, SUM(sourcebytes) AS bytes FROM flows \
             WHERE destinationport = 22 AND sourcebytes > 1000 \
             GROUP BY sourceip HAVING bytes > 5000 ORDER BY bytes DESC \
             LIMIT 50 LAST 24 HOURS"
        );
    }

    #[test]
    fn test_clause_positions_are_ordered() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["sourceip", "COUNT(*)"])
            .filter("magnitude >= 7")
            .group_by(&["sourceip"])
            .limit(10);

        let query = assemble(&draft).unwrap();
        let where_pos = query.find("WHERE").unwrap();
        let group_pos = query.find("GROUP BY").unwrap();
        let limit_pos = query.find("LIMIT").unwrap();
        assert!(where_pos < group_pos && group_pos < limit_pos);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["*"])
            .filter("severity > 5")
            .time_window(TimeWindow::last(7, TimeUnit::Days));
        let copy = draft.clone();

        assert_eq!(assemble(&draft).unwrap(), assemble(&copy).unwrap());
    }

    #[test]
    fn test_assemble_absolute_window() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["*"])
            .time_window(TimeWindow::Absolute {
                start: "2024-01-01 00:00".to_string(),
                stop: None,
            });

        assert_eq!(
            assemble(&draft).unwrap(),
            "SELECT * FROM events START '2024-01-01 00:00'"
        );
    }

    #[test]
    fn test_assemble_multiline() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["*"])
            .filter("magnitude > 5")
            .time_window(TimeWindow::last(1, TimeUnit::Hours));

        assert_eq!(
            assemble_multiline(&draft).unwrap(),
            "SELECT *\nFROM events\nWHERE magnitude > 5\nLAST 1 HOURS"
        );
    }

    #[test]
    fn test_multiple_order_columns() {
        let draft = QueryDraft::new(Table::Events)
            .select(&["*"])
            .order_by(&["magnitude", "starttime"], SortDirection::Asc);

        assert!(assemble(&draft)
            .unwrap()
            .ends_with("ORDER BY magnitude, starttime ASC"));
    }

    #[test]
    fn test_blank_select_entries_dropped() {
        let draft = QueryDraft::new(Table::Events).select(&["", "a"]);
        assert_eq!(assemble(&draft).unwrap(), "SELECT a FROM events");

        let grouped = QueryDraft::new(Table::Events)
            .select(&["sourceip", "COUNT(*)"])
            .group_by(&[" ", "sourceip", ""]);
        assert_eq!(
            assemble(&grouped).unwrap(),
            "SELECT sourceip, COUNT(*) FROM events GROUP BY sourceip"
        );
    }

    #[test]
    fn test_invalid_time_window_omitted() {
        let zero = QueryDraft::new(Table::Events)
            .select(&["*"])
            .time_window(TimeWindow::last(0, TimeUnit::Hours));
        assert_eq!(assemble(&zero).unwrap(), "SELECT * FROM events");

        let quoted = QueryDraft::new(Table::Events)
            .select(&["*"])
            .time_window(TimeWindow::Absolute {
                start: "x'y".to_string(),
                stop: None,
            });
        assert_eq!(assemble(&quoted).unwrap(), "SELECT * FROM events");
    }

    mod proptest_assemble {
        use super::*;
        use proptest::prelude::*;

        fn identifier() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9_]{0,7}"
        }

        fn table() -> impl Strategy<Value = Table> {
            prop_oneof![Just(Table::Events), Just(Table::Flows)]
        }

        fn direction() -> impl Strategy<Value = SortDirection> {
            prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
        }

        fn unit() -> impl Strategy<Value = TimeUnit> {
            prop_oneof![
                Just(TimeUnit::Minutes),
                Just(TimeUnit::Hours),
                Just(TimeUnit::Days)
            ]
        }

        prop_compose! {
            fn full_draft()(
                table in table(),
                columns in prop::collection::vec(identifier(), 1..5),
                conditions in prop::collection::vec((identifier(), 0u32..1000), 1..4),
                group_by in prop::collection::vec(identifier(), 1..3),
                having in prop::collection::vec(identifier(), 1..3),
                order_by in prop::collection::vec(identifier(), 1..3),
                direction in direction(),
                limit in 1u32..100_000,
                amount in 1u32..1000,
                unit in unit(),
            ) -> QueryDraft {
                let mut draft = QueryDraft::new(table);
                draft.set_columns(columns);
                for (field, value) in conditions {
                    draft.add_condition(format!("{} = {}", field, value));
                }
                draft.set_group_by(group_by);
                for field in having {
                    draft.add_having(format!("COUNT({}) > 1", field));
                }
                draft.set_order_by(order_by, direction);
                draft.limit(limit).time_window(TimeWindow::last(amount, unit))
            }
        }

        proptest! {
            /// Every clause lands in its fixed slot
            #[test]
            fn clauses_keep_fixed_order(draft in full_draft()) {
                let query = assemble(&draft).unwrap();
                let positions: Vec<usize> = [
                    "SELECT ", " FROM ", " WHERE ", " GROUP BY ", " HAVING ",
                    " ORDER BY ", " LIMIT ", " LAST ",
                ]
                .iter()
                .map(|keyword| query.find(keyword).unwrap())
                .collect();
                prop_assert!(
                    positions.windows(2).all(|pair| pair[0] < pair[1]),
                    "out of order: {}",
                    query
                );
            }

            /// A clone assembles to the same text
            #[test]
            fn assemble_is_deterministic(draft in full_draft()) {
                let copy = draft.clone();
                prop_assert_eq!(assemble(&draft).unwrap(), assemble(&copy).unwrap());
                prop_assert_eq!(
                    assemble_multiline(&draft).unwrap(),
                    assemble_multiline(&copy).unwrap()
                );
            }

            /// Blank SELECT entries never reach the output
            #[test]
            fn blank_columns_never_emitted(
                columns in prop::collection::vec(
                    prop_oneof![Just(String::new()), Just(" ".to_string()), identifier()],
                    1..6
                )
            ) {
                let names: Vec<&str> = columns.iter().map(String::as_str).collect();
                let kept: Vec<&str> = names.iter().copied().filter(|c| !c.trim().is_empty()).collect();
                let draft = QueryDraft::new(Table::Events).select(&names);

                if kept.is_empty() {
                    prop_assert_eq!(
                        assemble(&draft),
                        Err(QueryError::IncompleteDraft { field: "columns" })
                    );
                } else {
                    prop_assert_eq!(
                        assemble(&draft).unwrap(),
                        format!("SELECT {} FROM events", kept.join(", "))
                    );
                }
            }
        }
    }
}
