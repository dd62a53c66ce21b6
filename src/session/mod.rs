//! Interactive Terminal Session
//!
//! Menu-driven front end over the catalog, template library, assembler and
//! validator. A session owns one [`QueryDraft`] and talks to any
//! `BufRead`/`Write` pair, so it can drive a real terminal or an in-memory
//! buffer.
//!
//! End of input at any prompt ends the session cleanly.
//!
//! # Example
//!
//! ```rust
//! use aql_builder::config::BuilderConfig;
//! use aql_builder::session::Session;
//! use std::io::Cursor;
//!
//! let settings = BuilderConfig { clear_screen: false, clipboard: false, ..Default::default() };
//! let mut session = Session::new(Cursor::new("0\n"), Vec::new(), settings);
//! session.run().unwrap();
//!
//! let output = String::from_utf8(session.into_output()).unwrap();
//! assert!(output.contains("Goodbye!"));
//! ```

pub mod clipboard;

pub use clipboard::{Clipboard, ClipboardError};

use std::io::{self, BufRead, Write};

use crate::catalog::{self, OperatorGroup};
use crate::config::BuilderConfig;
use crate::query::{
    assemble, assemble_multiline, conditions, QueryDraft, SortDirection, Table, TimeUnit,
    TimeWindow,
};
use crate::templates::{self, TemplateEntry};
use crate::validator::{ValidationReport, Validator};

/// Reasons a screen stops early
enum Exit {
    Eof,
    Io(io::Error),
}

impl From<io::Error> for Exit {
    fn from(e: io::Error) -> Self {
        Exit::Io(e)
    }
}

type Step<T = ()> = Result<T, Exit>;

/// Which predicate list an edit applies to
#[derive(Clone, Copy)]
enum Predicates {
    Where,
    Having,
}

const HELP: &str = "
BASIC QUERY STRUCTURE:
  SELECT <columns>
  FROM <table>
  [WHERE <conditions>]
  [GROUP BY <columns>]
  [HAVING <conditions>]
  [ORDER BY <columns> [ASC|DESC]]
  [LIMIT <number>]
  [LAST <time> | START '<datetime>' STOP '<datetime>']

TABLES:
  - events    : Security events
  - flows     : Network flow data

EXAMPLES:
  1. Simple query:
     SELECT * FROM events LAST 1 HOURS

  2. Filter by IP:
     SELECT sourceip, destinationip, username
     FROM events
     WHERE sourceip = '192.168.1.1'
     LAST 24 HOURS

  3. Aggregation:
     SELECT sourceip, COUNT(*) as count
     FROM events
     GROUP BY sourceip
     ORDER BY count DESC
     LIMIT 10
     LAST 7 DAYS

  4. Using functions:
     SELECT LOGSOURCENAME(logsourceid), QIDNAME(qid), sourceip
     FROM events
     WHERE magnitude > 5
     LAST 1 HOURS

TIPS:
  - Use single quotes for strings: WHERE username = 'admin'
  - Use double quotes for column aliases: AS \"My Column\"
  - Field names are case-sensitive
  - Keywords (SELECT, FROM, etc.) are NOT case-sensitive
  - Use ILIKE for case-insensitive matching
  - Use IMATCHES for case-insensitive regex
";

const QUICK_REFERENCE: &str = "
Enter your AQL query directly. Press Enter twice to finish.

QUICK REFERENCE:
  SELECT * FROM events WHERE <condition> LAST <time>
  SELECT * FROM flows WHERE <condition> LAST <time>

COMMON FIELDS:
  events: sourceip, destinationip, username, magnitude, payload, qid
  flows:  sourceip, destinationip, sourcebytes, destinationbytes

COMMON FUNCTIONS:
  LOGSOURCENAME(logsourceid), QIDNAME(qid), CATEGORYNAME(category)
  COUNT(*), SUM(), AVG(), DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm')

OPERATORS:
  = != < > <= >=  |  LIKE ILIKE MATCHES IMATCHES  |  AND OR NOT
  IN (val1, val2)  |  BETWEEN x AND y  |  IS NULL  |  IS NOT NULL

TIME:
  LAST 1 HOURS  |  LAST 24 HOURS  |  LAST 7 DAYS
  START '2024-01-01 00:00' STOP '2024-01-02 00:00'
";

const CONDITION_PATTERNS: [(&str, &str); 11] = [
    ("IP matching:", "sourceip = '192.168.1.1'"),
    ("CIDR range:", "INCIDR('192.168.0.0/16', sourceip)"),
    ("String equals:", "username = 'admin'"),
    ("Pattern match:", "payload ILIKE '%error%'"),
    ("Regex match:", "username IMATCHES '.*admin.*'"),
    ("Numeric compare:", "magnitude >= 7"),
    ("Range:", "eventcount BETWEEN 10 AND 100"),
    ("List:", "sourceport IN (22, 23, 3389)"),
    ("Null check:", "username IS NOT NULL"),
    ("Log source:", "LOGSOURCENAME(logsourceid) ILIKE '%Windows%'"),
    ("Event name:", "QIDNAME(qid) ILIKE '%login%'"),
];

/// Preset time windows offered when modifying a template
const TEMPLATE_WINDOWS: [(u32, TimeUnit); 4] = [
    (1, TimeUnit::Hours),
    (24, TimeUnit::Hours),
    (7, TimeUnit::Days),
    (30, TimeUnit::Days),
];

/// One interactive session over an input and an output stream
pub struct Session<R, W> {
    input: R,
    output: W,
    draft: QueryDraft,
    settings: BuilderConfig,
    validator: Validator,
    clipboard: Clipboard,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, settings: BuilderConfig) -> Self {
        let mut session = Self {
            input,
            output,
            draft: QueryDraft::default(),
            clipboard: Clipboard::new(settings.clipboard),
            settings,
            validator: Validator::default(),
        };
        session.start_draft();
        session
    }

    /// The draft being edited
    pub fn draft(&self) -> &QueryDraft {
        &self.draft
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user exits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        tracing::debug!("Session started");
        let result = match self.main_menu() {
            Ok(()) => Ok(()),
            Err(Exit::Eof) => {
                writeln!(self.output, "\n\nGoodbye!")?;
                Ok(())
            }
            Err(Exit::Io(e)) => Err(e),
        };
        self.output.flush()?;
        tracing::debug!("Session ended");
        result
    }

    // Input helpers

    fn read_line(&mut self) -> Step<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Exit::Eof);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn prompt(&mut self, text: &str) -> Step<String> {
        write!(self.output, "{}", text)?;
        Ok(self.read_line()?.trim().to_string())
    }

    fn pause(&mut self) -> Step {
        self.prompt("  Press Enter to continue...")?;
        Ok(())
    }

    /// Lines up to the first empty one, joined with spaces
    fn read_block(&mut self) -> Step<String> {
        let mut lines = Vec::new();
        loop {
            match self.read_line() {
                Ok(line) if line.trim().is_empty() => break,
                Ok(line) => lines.push(line),
                Err(Exit::Eof) if !lines.is_empty() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(lines.join(" "))
    }

    // Output helpers

    fn clear(&mut self) -> Step {
        if self.settings.clear_screen {
            write!(self.output, "\x1b[2J\x1b[H")?;
        }
        Ok(())
    }

    fn rule(&mut self, width: usize) -> Step {
        writeln!(self.output, "{}", "-".repeat(width))?;
        Ok(())
    }

    fn banner(&mut self, title: &str, width: usize) -> Step {
        self.clear()?;
        writeln!(self.output, "{}", "=".repeat(width))?;
        writeln!(self.output, "  {}", title)?;
        writeln!(self.output, "{}", "=".repeat(width))?;
        Ok(())
    }

    fn copy(&mut self, query: &str) -> Step {
        match self.clipboard.copy(query) {
            Ok(_) => writeln!(self.output, "\n  Query copied to clipboard!")?,
            Err(e) => {
                tracing::debug!(error = %e, "Clipboard copy failed");
                writeln!(self.output, "\n  {}", e)?;
                writeln!(self.output, "  Query: {}", query)?;
            }
        }
        self.pause()
    }

    fn print_report(&mut self, report: &ValidationReport, bullet: &str) -> Step {
        for finding in &report.findings {
            writeln!(self.output, "  {} {}", bullet, finding)?;
        }
        Ok(())
    }

    // Main menu

    fn main_menu(&mut self) -> Step {
        loop {
            self.clear()?;
            writeln!(self.output, "{}", "=".repeat(60))?;
            writeln!(self.output, "           AQL BUILDER - QRadar Query Helper")?;
            writeln!(self.output, "{}", "=".repeat(60))?;
            writeln!(self.output)?;
            writeln!(self.output, "MAIN MENU")?;
            self.rule(40)?;
            writeln!(self.output, "  1. Build a new query (step-by-step)")?;
            writeln!(self.output, "  2. Query templates (pre-built queries)")?;
            writeln!(self.output, "  3. Reference - Fields")?;
            writeln!(self.output, "  4. Reference - Functions")?;
            writeln!(self.output, "  5. Reference - Operators")?;
            writeln!(self.output, "  6. Reference - Time clauses")?;
            writeln!(self.output, "  7. Quick query (free-form with hints)")?;
            writeln!(self.output, "  8. Validate a query")?;
            writeln!(self.output, "  9. Help / AQL Syntax Guide")?;
            writeln!(self.output, "  0. Exit")?;
            self.rule(40)?;

            match self.prompt("Enter choice: ")?.as_str() {
                "0" => {
                    writeln!(self.output, "\nGoodbye!")?;
                    return Ok(());
                }
                "1" => self.builder()?,
                "2" => self.template_categories()?,
                "3" => self.field_reference()?,
                "4" => self.function_reference()?,
                "5" => self.operator_reference()?,
                "6" => self.time_reference()?,
                "7" => self.quick_query()?,
                "8" => self.validate_screen()?,
                "9" => self.help()?,
                other => writeln!(
                    self.output,
                    "  Invalid choice '{}'. Please enter a number from 0 to 9",
                    other
                )?,
            }
        }
    }

    // Builder

    fn start_draft(&mut self) {
        self.draft.reset();
        self.draft.set_table(self.settings.default_table);
        self.draft.set_columns(["*"]);
    }

    fn show_current(&mut self) -> Step {
        writeln!(self.output, "\n{}", "=".repeat(60))?;
        writeln!(self.output, "CURRENT QUERY:")?;
        self.rule(60)?;
        match assemble_multiline(&self.draft) {
            Ok(query) => writeln!(self.output, "{}", query)?,
            Err(e) => writeln!(self.output, "  (incomplete: {})", e)?,
        }
        writeln!(self.output, "{}\n", "=".repeat(60))?;
        Ok(())
    }

    fn builder(&mut self) -> Step {
        self.start_draft();

        loop {
            self.banner("INTERACTIVE QUERY BUILDER", 60)?;
            self.show_current()?;

            writeln!(self.output, "BUILD OPTIONS:")?;
            self.rule(40)?;
            writeln!(self.output, "  1. Set SELECT columns")?;
            writeln!(self.output, "  2. Set FROM table (events/flows)")?;
            writeln!(self.output, "  3. Add WHERE condition")?;
            writeln!(self.output, "  4. Add GROUP BY columns")?;
            writeln!(self.output, "  5. Add HAVING condition")?;
            writeln!(self.output, "  6. Set ORDER BY")?;
            writeln!(self.output, "  7. Set LIMIT")?;
            writeln!(self.output, "  8. Set TIME clause")?;
            writeln!(self.output, "  9. Clear and restart")?;
            writeln!(self.output, "{}", "  -".repeat(20))?;
            writeln!(self.output, "  c. Copy query to clipboard")?;
            writeln!(self.output, "  f. Finish and display query")?;
            writeln!(self.output, "  q. Back to main menu")?;
            self.rule(40)?;

            match self.prompt("Enter choice: ")?.to_lowercase().as_str() {
                "q" => return Ok(()),
                "1" => self.edit_select()?,
                "2" => self.edit_from()?,
                "3" => self.edit_predicates(Predicates::Where)?,
                "4" => self.edit_group_by()?,
                "5" => self.edit_predicates(Predicates::Having)?,
                "6" => self.edit_order_by()?,
                "7" => self.edit_limit()?,
                "8" => self.edit_time()?,
                "9" => {
                    self.start_draft();
                    writeln!(self.output, "\n  Query cleared!")?;
                    self.pause()?;
                }
                "c" => match assemble(&self.draft) {
                    Ok(query) => self.copy(&query)?,
                    Err(e) => {
                        writeln!(self.output, "\n  {}", e)?;
                        self.pause()?;
                    }
                },
                "f" => {
                    if self.finish()? {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn edit_select(&mut self) -> Step {
        self.banner("SELECT COLUMNS", 60)?;

        let table = self.draft.table.unwrap_or(self.settings.default_table);
        writeln!(self.output, "\nAvailable fields for {}:", table)?;
        self.rule(40)?;
        for pair in catalog::list_fields(table).chunks(2) {
            let line: String = pair.iter().map(|f| format!("  {:<30}", f.name)).collect();
            writeln!(self.output, "{}", line.trim_end())?;
        }

        writeln!(self.output, "\nCOMMON FUNCTIONS:")?;
        writeln!(
            self.output,
            "  LOGSOURCENAME(logsourceid), QIDNAME(qid), CATEGORYNAME(category)"
        )?;
        writeln!(
            self.output,
            "  DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm:ss'), COUNT(*), SUM(field)"
        )?;

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "Enter columns separated by commas, or:")?;
        writeln!(self.output, "  * for all columns")?;
        writeln!(self.output, "  Press Enter to keep current selection")?;
        self.rule(60)?;
        writeln!(self.output, "Current: {}\n", self.draft.columns.join(", "))?;

        let columns = split_list(&self.prompt("Columns: ")?);
        if !columns.is_empty() {
            self.draft.set_columns(columns);
        }
        Ok(())
    }

    fn edit_from(&mut self) -> Step {
        self.banner("SELECT TABLE", 60)?;
        writeln!(self.output, "\nAvailable tables:")?;
        for (i, table) in Table::ALL.iter().enumerate() {
            writeln!(
                self.output,
                "  {}. {:<6} - {}",
                i + 1,
                table.as_str(),
                table.description()
            )?;
        }
        let current = self.draft.table.unwrap_or(self.settings.default_table);
        writeln!(self.output, "\nCurrent: {}\n", current)?;

        let choice = self.prompt("Enter 1 or 2 (or press Enter to keep current): ")?;
        if let Some(table) = pick(&choice, &Table::ALL) {
            self.draft.set_table(table);
        }
        Ok(())
    }

    fn predicates(&self, which: Predicates) -> &[String] {
        match which {
            Predicates::Where => &self.draft.conditions,
            Predicates::Having => &self.draft.having,
        }
    }

    fn edit_predicates(&mut self, which: Predicates) -> Step {
        match which {
            Predicates::Where => self.banner("WHERE CONDITIONS", 60)?,
            Predicates::Having => self.banner("HAVING (filter on aggregated results)", 60)?,
        }

        writeln!(self.output, "\nCurrent conditions:")?;
        let current = self.predicates(which).to_vec();
        if current.is_empty() {
            writeln!(self.output, "  (none)")?;
        }
        for (i, condition) in current.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, condition)?;
        }

        if let Predicates::Having = which {
            writeln!(self.output)?;
            self.rule(60)?;
            writeln!(self.output, "HAVING is used to filter results after GROUP BY")?;
            writeln!(self.output, "Example: HAVING COUNT(*) > 10")?;
        }

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "OPTIONS:")?;
        writeln!(self.output, "  1. Add new condition")?;
        writeln!(self.output, "  2. Remove a condition")?;
        writeln!(self.output, "  3. Clear all conditions")?;
        writeln!(self.output, "  4. Back")?;
        self.rule(60)?;

        match (self.prompt("Choice: ")?.as_str(), which) {
            ("1", Predicates::Where) => self.add_where()?,
            ("1", Predicates::Having) => {
                let condition = self.prompt("\nEnter HAVING condition: ")?;
                self.draft.add_having(condition);
            }
            ("2", _) => self.remove_predicate(which)?,
            ("3", Predicates::Where) => {
                self.draft.clear_conditions();
                writeln!(self.output, "\n  All conditions cleared!")?;
                self.pause()?;
            }
            ("3", Predicates::Having) => self.draft.clear_having(),
            _ => {}
        }
        Ok(())
    }

    fn add_where(&mut self) -> Step {
        self.banner("ADD WHERE CONDITION", 60)?;

        writeln!(self.output, "\nCOMMON PATTERNS:")?;
        self.rule(60)?;
        for (label, example) in CONDITION_PATTERNS {
            writeln!(self.output, "  {:<18} {}", label, example)?;
        }
        self.rule(60)?;

        writeln!(self.output, "\nQuick add (enter number):")?;
        writeln!(self.output, "  1. Filter by source IP")?;
        writeln!(self.output, "  2. Filter by destination IP")?;
        writeln!(self.output, "  3. Filter by username")?;
        writeln!(self.output, "  4. Filter by magnitude")?;
        writeln!(self.output, "  5. Filter by log source")?;
        writeln!(self.output, "  6. Filter by event name (QID)")?;
        writeln!(self.output, "  7. Custom condition")?;

        let condition = match self.prompt("\nChoice: ")?.as_str() {
            "1" => non_blank(self.prompt("Enter source IP (or CIDR): ")?)
                .map(|ip| conditions::source_ip(&ip)),
            "2" => non_blank(self.prompt("Enter destination IP (or CIDR): ")?)
                .map(|ip| conditions::destination_ip(&ip)),
            "3" => non_blank(self.prompt("Enter username (use % for wildcard): ")?)
                .map(|user| conditions::username(&user)),
            "4" => self.magnitude_condition()?,
            "5" => non_blank(self.prompt("Enter log source name pattern: ")?)
                .map(|name| conditions::log_source(&name)),
            "6" => non_blank(self.prompt("Enter event name pattern: ")?)
                .map(|name| conditions::event_name(&name)),
            "7" => non_blank(self.prompt("Enter custom condition: ")?),
            _ => None,
        };

        if let Some(condition) = condition {
            if self.draft.add_condition(condition.clone()) {
                writeln!(self.output, "\n  Added: {}", condition)?;
                self.pause()?;
            }
        }
        Ok(())
    }

    fn magnitude_condition(&mut self) -> Step<Option<String>> {
        writeln!(
            self.output,
            "  Operators: {}",
            conditions::NUMERIC_OPERATORS.join(" ")
        )?;
        let op = non_blank(self.prompt("  Operator: ")?).unwrap_or_else(|| ">=".to_string());
        let value = non_blank(self.prompt("  Value (1-10): ")?).unwrap_or_else(|| "5".to_string());

        let result = match value.parse::<u8>() {
            Ok(value) => conditions::magnitude(&op, value).map_err(|e| e.to_string()),
            Err(_) => Err(format!("'{}' is not a magnitude between 1 and 10", value)),
        };

        match result {
            Ok(condition) => Ok(Some(condition)),
            Err(message) => {
                writeln!(self.output, "\n  {}", message)?;
                self.pause()?;
                Ok(None)
            }
        }
    }

    fn remove_predicate(&mut self, which: Predicates) -> Step {
        if self.predicates(which).is_empty() {
            writeln!(self.output, "\n  No conditions to remove!")?;
            return self.pause();
        }

        writeln!(self.output, "\nEnter number to remove (or press Enter to cancel): ")?;
        let number = self.prompt("Number: ")?;
        if !number.is_empty() {
            let removed = match number.parse::<usize>() {
                Ok(n) if n >= 1 => match which {
                    Predicates::Where => self.draft.remove_condition(n - 1),
                    Predicates::Having => self.draft.remove_having(n - 1),
                },
                _ => None,
            };
            match removed {
                Some(condition) => writeln!(self.output, "\n  Removed: {}", condition)?,
                None => writeln!(self.output, "\n  Invalid number!")?,
            }
        }
        self.pause()
    }

    fn edit_group_by(&mut self) -> Step {
        self.banner("GROUP BY", 60)?;

        writeln!(self.output, "\nCurrent GROUP BY columns:")?;
        if self.draft.group_by.is_empty() {
            writeln!(self.output, "  (none)")?;
        } else {
            writeln!(self.output, "  {}", self.draft.group_by.join(", "))?;
        }

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(
            self.output,
            "When using GROUP BY, use aggregation functions in SELECT:"
        )?;
        let aggregates: Vec<String> = catalog::aggregate_functions()
            .take(5)
            .map(|name| format!("{}(...)", name))
            .collect();
        writeln!(self.output, "  {}", aggregates.join(", "))?;
        writeln!(self.output, "\nExample SELECT with GROUP BY:")?;
        writeln!(
            self.output,
            "  SELECT sourceip, COUNT(*) as count, SUM(eventcount)"
        )?;
        self.rule(60)?;

        writeln!(self.output, "\nEnter columns to group by (comma-separated)")?;
        writeln!(self.output, "Or press Enter to keep current:")?;

        let columns = split_list(&self.prompt("\nColumns: ")?);
        if !columns.is_empty() {
            self.draft.set_group_by(columns);
        }
        Ok(())
    }

    fn edit_order_by(&mut self) -> Step {
        self.banner("ORDER BY", 60)?;

        writeln!(self.output, "\nCurrent ORDER BY:")?;
        match &self.draft.order_by {
            Some(order) => writeln!(
                self.output,
                "  {} {}",
                order.columns.join(", "),
                order.direction
            )?,
            None => writeln!(self.output, "  (none)")?,
        }

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "Common ORDER BY columns:")?;
        writeln!(self.output, "  starttime, magnitude, eventcount, sourceip")?;
        writeln!(self.output, "  Or use aggregates: COUNT(*), SUM(eventcount)")?;
        self.rule(60)?;

        let columns = split_list(&self.prompt("\nEnter column(s) to order by (comma-separated): ")?);
        if columns.is_empty() {
            return Ok(());
        }

        writeln!(self.output, "\nDirection:")?;
        writeln!(self.output, "  1. DESC (descending - highest first)")?;
        writeln!(self.output, "  2. ASC (ascending - lowest first)")?;
        let default = self.settings.default_order;
        let direction = match self
            .prompt(&format!("Choice (default {}): ", default))?
            .as_str()
        {
            "1" => SortDirection::Desc,
            "2" => SortDirection::Asc,
            _ => default,
        };

        self.draft.set_order_by(columns, direction);
        Ok(())
    }

    fn edit_limit(&mut self) -> Step {
        self.banner("LIMIT", 60)?;

        match self.draft.limit {
            Some(limit) => writeln!(self.output, "\nCurrent LIMIT: {}", limit)?,
            None => writeln!(self.output, "\nCurrent LIMIT: (none)")?,
        }

        writeln!(
            self.output,
            "\nEnter maximum number of results (or press Enter to clear):"
        )?;
        let input = self.prompt("Limit: ")?;
        if input.is_empty() {
            self.draft.clear_limit();
            return Ok(());
        }

        let result = match input.parse::<u32>() {
            Ok(n) => self.draft.set_limit(n).map_err(|e| e.to_string()),
            Err(_) => Err("Invalid number!".to_string()),
        };
        if let Err(message) = result {
            writeln!(self.output, "  {}", message)?;
            self.pause()?;
        }
        Ok(())
    }

    fn edit_time(&mut self) -> Step {
        self.banner("TIME CLAUSE", 60)?;

        let current = self
            .draft
            .time_window
            .clause()
            .unwrap_or_else(|| "(none)".to_string());
        writeln!(self.output, "\nCurrent time clause: {}", current)?;

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "OPTIONS:")?;
        writeln!(self.output, "  1. LAST (relative time)")?;
        writeln!(self.output, "  2. START/STOP (specific date range)")?;
        writeln!(self.output, "  3. Clear time clause")?;
        writeln!(self.output, "  4. Back")?;
        self.rule(60)?;

        let window = match self.prompt("\nChoice: ")?.as_str() {
            "1" => {
                writeln!(
                    self.output,
                    "\nExamples: 5 MINUTES, 1 HOURS, 24 HOURS, 7 DAYS"
                )?;
                let amount =
                    non_blank(self.prompt("Enter time amount: ")?).unwrap_or_else(|| "1".to_string());
                writeln!(self.output, "Units: 1=MINUTES, 2=HOURS, 3=DAYS")?;
                let unit = pick(&self.prompt("Unit: ")?, &TimeUnit::ALL).unwrap_or(TimeUnit::Hours);

                match amount.parse::<u32>() {
                    Ok(amount) => {
                        let window = TimeWindow::last(amount, unit);
                        window.validate().map(|_| window).map_err(|e| e.to_string())
                    }
                    Err(_) => Err(format!("'{}' is not a whole number", amount)),
                }
            }
            "2" => {
                writeln!(
                    self.output,
                    "\nFormat: yyyy-MM-dd HH:mm or yyyy-MM-dd HH:mm:ss"
                )?;
                let start = self.prompt("Start datetime: ")?;
                let stop = self.prompt("Stop datetime (leave empty for now): ")?;
                if start.is_empty() {
                    return Ok(());
                }
                TimeWindow::absolute(start, Some(stop)).map_err(|e| e.to_string())
            }
            "3" => Ok(TimeWindow::None),
            _ => return Ok(()),
        };

        match window {
            Ok(window) => self.draft.set_time_window(window),
            Err(message) => {
                writeln!(self.output, "\n  {}", message)?;
                self.pause()?;
            }
        }
        Ok(())
    }

    /// Show the final query; `true` means return to the main menu
    fn finish(&mut self) -> Step<bool> {
        self.banner("FINAL QUERY", 60)?;

        let (query, formatted) = match assemble(&self.draft)
            .and_then(|q| assemble_multiline(&self.draft).map(|f| (q, f)))
        {
            Ok(pair) => pair,
            Err(e) => {
                writeln!(self.output, "\n  {}", e)?;
                self.pause()?;
                return Ok(false);
            }
        };

        writeln!(self.output, "\nFormatted:")?;
        self.rule(60)?;
        writeln!(self.output, "{}", formatted)?;
        self.rule(60)?;

        writeln!(self.output, "\nSingle line:")?;
        self.rule(60)?;
        writeln!(self.output, "{}", query)?;
        self.rule(60)?;

        writeln!(self.output, "\n[c] Copy to clipboard")?;
        writeln!(self.output, "[Enter] Continue building")?;
        writeln!(self.output, "[q] Back to main menu")?;

        match self.prompt("\nChoice: ")?.to_lowercase().as_str() {
            "c" => {
                self.copy(&query)?;
                Ok(false)
            }
            "q" => Ok(true),
            _ => Ok(false),
        }
    }

    // Templates

    fn template_categories(&mut self) -> Step {
        loop {
            self.banner("AQL QUERY TEMPLATES", 60)?;
            writeln!(self.output)?;

            let categories = templates::list_categories();
            for (i, category) in categories.iter().enumerate() {
                let count = templates::list_templates(category).len();
                writeln!(self.output, "  {}. {} ({} queries)", i + 1, category, count)?;
            }
            writeln!(self.output, "\n  0. Back to main menu")?;
            self.rule(60)?;

            let choice = self.prompt("\nSelect category: ")?;
            if choice == "0" {
                return Ok(());
            }
            if let Some(category) = pick(&choice, categories) {
                self.template_list(category)?;
            }
        }
    }

    fn template_list(&mut self, category: &str) -> Step {
        let entries = templates::list_templates(category);

        loop {
            self.banner(&category.to_uppercase(), 60)?;
            writeln!(self.output)?;
            for (i, template) in entries.iter().enumerate() {
                writeln!(self.output, "  {}. {}", i + 1, template.name)?;
                writeln!(self.output, "     {}\n", template.description)?;
            }
            writeln!(self.output, "  0. Back")?;
            self.rule(60)?;

            let choice = self.prompt("\nSelect template: ")?;
            if choice == "0" {
                return Ok(());
            }
            if let Some(template) = pick(&choice, &entries) {
                self.show_template(template)?;
            }
        }
    }

    fn show_template(&mut self, template: &TemplateEntry) -> Step {
        self.banner(&template.name.to_uppercase(), 70)?;
        writeln!(self.output, "\nDescription: {}\n", template.description)?;
        writeln!(self.output, "QUERY:")?;
        self.rule(70)?;
        writeln!(self.output, "{}", template.query)?;
        self.rule(70)?;

        if !template.params.is_empty() {
            writeln!(self.output, "\nCustomizable parameters:")?;
            for param in template.params {
                writeln!(self.output, "  - {}", param)?;
            }
        }

        writeln!(self.output)?;
        self.rule(70)?;
        writeln!(self.output, "OPTIONS:")?;
        writeln!(self.output, "  [c] Copy to clipboard")?;
        writeln!(self.output, "  [m] Modify parameters")?;
        writeln!(self.output, "  [Enter] Back")?;
        self.rule(70)?;

        match self.prompt("\nChoice: ")?.to_lowercase().as_str() {
            "c" => self.copy(template.query),
            "m" => self.modify_template(template),
            _ => Ok(()),
        }
    }

    fn modify_template(&mut self, template: &TemplateEntry) -> Step {
        self.banner("MODIFY TEMPLATE", 60)?;
        writeln!(
            self.output,
            "\nEnter values for placeholders (press Enter to keep default):\n"
        )?;

        let mut query = template.query.to_string();
        for name in template.placeholders() {
            let value = self.prompt(&format!("  {}: ", name))?;
            if !value.is_empty() {
                query = templates::fill_placeholders(&query, [(name.as_str(), value.as_str())]);
            }
        }

        writeln!(self.output, "\nModify time range?")?;
        for (i, (amount, unit)) in TEMPLATE_WINDOWS.iter().enumerate() {
            writeln!(self.output, "  {}. LAST {} {}", i + 1, amount, unit)?;
        }
        writeln!(self.output, "  5. Custom")?;
        writeln!(self.output, "  Enter. Keep current")?;

        let choice = self.prompt("\nChoice: ")?;
        let window = match pick(&choice, &TEMPLATE_WINDOWS) {
            Some((amount, unit)) => Some(TimeWindow::last(amount, unit)),
            None if choice == "5" => {
                let custom = self.prompt("Enter custom time clause: ")?;
                if custom.is_empty() {
                    None
                } else {
                    match TimeWindow::parse(&custom) {
                        Ok(window) => Some(window),
                        Err(e) => {
                            writeln!(self.output, "\n  {} (keeping current time range)", e)?;
                            None
                        }
                    }
                }
            }
            None => None,
        };
        if let Some(window) = window {
            query = templates::with_time_window(&query, &window);
        }

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "MODIFIED QUERY:")?;
        self.rule(60)?;
        writeln!(self.output, "{}", query)?;
        self.rule(60)?;

        writeln!(self.output, "\n[c] Copy to clipboard")?;
        if self.prompt("[Enter] Back: ")?.eq_ignore_ascii_case("c") {
            self.copy(&query)?;
        }
        Ok(())
    }

    // Reference screens

    fn field_reference(&mut self) -> Step {
        self.banner("FIELD REFERENCE", 60)?;
        writeln!(self.output)?;
        for (i, table) in Table::ALL.iter().enumerate() {
            writeln!(self.output, "  {}. {} fields", i + 1, table)?;
        }
        writeln!(self.output, "  {}. Back", Table::ALL.len() + 1)?;

        let Some(table) = pick(&self.prompt("\nEnter choice: ")?, &Table::ALL) else {
            return Ok(());
        };

        let title = match table {
            Table::Events => "EVENT FIELDS",
            Table::Flows => "FLOW FIELDS",
        };
        self.banner(title, 80)?;

        let fields = catalog::list_fields(table);
        for group in catalog::field_groups(table) {
            writeln!(self.output, "\n{}", group.name.to_uppercase())?;
            self.rule(70)?;
            for name in group.fields {
                if let Some(field) = fields.iter().find(|f| f.name == *name) {
                    writeln!(
                        self.output,
                        "  {:<35} {:<12} {}",
                        field.name,
                        field.data_type.unwrap_or(""),
                        field.description
                    )?;
                }
            }
        }

        writeln!(self.output)?;
        self.pause()
    }

    fn function_reference(&mut self) -> Step {
        self.banner("AQL FUNCTION REFERENCE", 80)?;
        writeln!(self.output)?;

        let categories = catalog::function_categories();
        for (i, category) in categories.iter().enumerate() {
            writeln!(self.output, "{}. {} Functions", i + 1, category.label)?;
        }
        writeln!(self.output, "{}. Back to main menu\n", categories.len() + 1)?;

        let Some(category) = pick(&self.prompt("Enter choice: ")?, categories) else {
            return Ok(());
        };

        self.banner(&format!("{} FUNCTIONS", category.label.to_uppercase()), 90)?;
        writeln!(self.output)?;
        for function in category.functions {
            writeln!(self.output, "  {}", function.name)?;
            if let Some(syntax) = function.example {
                writeln!(self.output, "    Syntax: {}", syntax)?;
            }
            writeln!(self.output, "    {}\n", function.description)?;
        }

        self.pause()
    }

    fn operator_reference(&mut self) -> Step {
        self.banner("AQL OPERATOR REFERENCE", 80)?;

        for group in OperatorGroup::ALL {
            writeln!(
                self.output,
                "\n{} OPERATORS",
                group.as_str().to_uppercase()
            )?;
            self.rule(60)?;
            for op in catalog::operators_in(group) {
                writeln!(self.output, "  {:<15} {}", op.name, op.description)?;
            }
        }

        writeln!(self.output, "\nEXAMPLES:")?;
        self.rule(60)?;
        for op in catalog::list_operators() {
            if let Some(example) = op.example {
                writeln!(self.output, "  WHERE {}", example)?;
            }
        }

        writeln!(self.output)?;
        self.pause()
    }

    fn time_reference(&mut self) -> Step {
        self.banner("AQL TIME CLAUSES", 80)?;
        let clauses = catalog::list_time_clauses();

        writeln!(self.output, "\nLAST CLAUSE (Relative Time)")?;
        self.rule(60)?;
        writeln!(self.output, "  Syntax: LAST <number> <unit>")?;
        writeln!(self.output, "  Units: MINUTES, HOURS, DAYS\n")?;
        for clause in clauses.iter().filter(|c| c.kind == "LAST") {
            writeln!(self.output, "  {:<40} # {}", clause.example, clause.description)?;
        }

        writeln!(self.output, "\nSTART/STOP CLAUSE (Absolute Time)")?;
        self.rule(60)?;
        writeln!(self.output, "  Syntax: START '<datetime>' [STOP '<datetime>']")?;
        writeln!(self.output, "  Format: yyyy-MM-dd HH:mm or yyyy-MM-dd HH:mm:ss")?;
        writeln!(self.output, "  Note: STOP is optional (defaults to now)\n")?;
        for clause in clauses.iter().filter(|c| c.kind == "START/STOP") {
            writeln!(self.output, "  {}\n    # {}", clause.example, clause.description)?;
        }

        writeln!(self.output, "\nPARSEDATETIME (Dynamic Time)")?;
        self.rule(60)?;
        writeln!(self.output, "  Syntax: START PARSEDATETIME('time reference')")?;
        writeln!(self.output, "  References: 'now', '1 hour ago', '1 day ago', etc.\n")?;
        for clause in clauses.iter().filter(|c| c.kind == "PARSEDATETIME") {
            writeln!(self.output, "  {}\n    # {}", clause.example, clause.description)?;
        }

        writeln!(self.output, "\nIMPORTANT NOTES:")?;
        self.rule(60)?;
        writeln!(
            self.output,
            "  - Time clauses must come AFTER LIMIT clause if both are used"
        )?;
        writeln!(
            self.output,
            "  - Example: SELECT * FROM events LIMIT 100 LAST 1 HOURS\n"
        )?;
        self.pause()
    }

    // Free-form screens

    fn quick_query(&mut self) -> Step {
        self.banner("QUICK QUERY MODE", 60)?;
        writeln!(self.output, "{}", QUICK_REFERENCE)?;
        writeln!(self.output, "Enter query (press Enter twice when done):")?;
        self.rule(60)?;

        let query = self.read_block()?;
        if query.trim().is_empty() {
            return Ok(());
        }

        writeln!(self.output)?;
        self.rule(60)?;
        writeln!(self.output, "Your query:")?;
        writeln!(self.output, "{}", query)?;
        self.rule(60)?;

        let report = self.validator.validate(&query);
        if report.findings.is_empty() {
            writeln!(self.output, "\nQuery looks valid!")?;
        } else {
            writeln!(self.output, "\nPotential issues found:")?;
            self.print_report(&report, "-")?;
        }

        writeln!(self.output, "\n[c] Copy to clipboard")?;
        if self.prompt("[Enter] Continue: ")?.eq_ignore_ascii_case("c") {
            self.copy(&query)?;
        }
        Ok(())
    }

    fn validate_screen(&mut self) -> Step {
        self.banner("QUERY VALIDATOR", 60)?;
        writeln!(
            self.output,
            "\nEnter your AQL query to validate (Enter twice when done):"
        )?;
        self.rule(60)?;

        let query = self.read_block()?;
        if !query.trim().is_empty() {
            let report = self.validator.validate(&query);

            writeln!(self.output, "\n{}", "=".repeat(60))?;
            writeln!(self.output, "VALIDATION RESULTS")?;
            writeln!(self.output, "{}", "=".repeat(60))?;

            if report.findings.is_empty() {
                writeln!(self.output, "\n  Query appears to be valid!")?;
            } else {
                writeln!(self.output, "\nIssues found:")?;
                self.print_report(&report, "!")?;
                writeln!(
                    self.output,
                    "\n  {} error(s), {} warning(s), {} suggestion(s)",
                    report.error_count(),
                    report.warning_count(),
                    report.suggestion_count()
                )?;
            }

            writeln!(self.output)?;
            self.rule(60)?;
            writeln!(
                self.output,
                "Note: This validates syntax only. Runtime errors may still occur."
            )?;
            self.rule(60)?;
        }

        writeln!(self.output)?;
        self.pause()
    }

    fn help(&mut self) -> Step {
        self.banner("AQL SYNTAX GUIDE", 60)?;
        writeln!(self.output, "{}", HELP)?;
        self.pause()
    }
}

/// Comma-separated list with blank entries dropped
fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 1-based menu choice into `items`
fn pick<T: Copy>(choice: &str, items: &[T]) -> Option<T> {
    let index = choice.trim().parse::<usize>().ok()?;
    index.checked_sub(1).and_then(|i| items.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (QueryDraft, String) {
        let settings = BuilderConfig {
            clear_screen: false,
            clipboard: false,
            ..Default::default()
        };
        let mut session = Session::new(Cursor::new(input.to_string()), Vec::new(), settings);
        session.run().unwrap();
        let draft = session.draft().clone();
        let output = String::from_utf8(session.into_output()).unwrap();
        (draft, output)
    }

    #[test]
    fn test_exit_from_main_menu() {
        let (_, out) = run("0\n");
        assert!(out.contains("MAIN MENU"));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let (_, out) = run("");
        assert!(out.contains("Goodbye!"));

        // Mid-screen
        let (_, out) = run("1\n3\n");
        assert!(out.contains("WHERE CONDITIONS"));
    }

    #[test]
    fn test_invalid_main_choice() {
        let (_, out) = run("x\n0\n");
        assert!(out.contains("Invalid choice 'x'"));
    }

    #[test]
    fn test_build_query_step_by_step() {
        let input = [
            "1",          // build
            "3", "1", "1", "10.0.0.0/8", "", // WHERE source CIDR
            "7", "25",    // LIMIT
            "8", "1", "2", "3", // LAST 2 DAYS
            "f", "q",     // finish, back to main menu
            "0",
        ]
        .join("\n");

        let (draft, out) = run(&input);
        assert_eq!(
            assemble(&draft).unwrap(),
            "SELECT * FROM events WHERE INCIDR('10.0.0.0/8', sourceip) LIMIT 25 LAST 2 DAYS"
        );
        assert!(out.contains("Added: INCIDR('10.0.0.0/8', sourceip)"));
        assert!(out.contains("Single line:"));
        assert!(out.contains("FROM events\nWHERE INCIDR('10.0.0.0/8', sourceip)\nLIMIT 25"));
    }

    #[test]
    fn test_build_aggregate_query() {
        let input = [
            "1",
            "2", "2",                        // flows
            "1", "sourceip, SUM(sourcebytes) AS total", // columns
            "4", "sourceip",                 // GROUP BY
            "5", "1", "SUM(sourcebytes) > 1000", // HAVING
            "6", "total", "",                // ORDER BY, default direction
            "q", "0",
        ]
        .join("\n");

        let (draft, _) = run(&input);
        assert_eq!(
            assemble(&draft).unwrap(),
            "SELECT sourceip, SUM(sourcebytes) AS total FROM flows GROUP BY sourceip \
             HAVING SUM(sourcebytes) > 1000 ORDER BY total DESC"
        );
    }

    #[test]
    fn test_remove_condition_and_restart() {
        let input = [
            "1",
            "3", "1", "3", "admin%", "",  // username ILIKE
            "3", "1", "7", "magnitude > 3", "",
            "3", "2", "1", "",            // remove the first
            "q", "0",
        ]
        .join("\n");
        let (draft, out) = run(&input);
        assert_eq!(draft.conditions, vec!["magnitude > 3"]);
        assert!(out.contains("Removed: username ILIKE 'admin%'"));

        let (draft, out) = run("1\n3\n1\n7\na = 1\n\n9\n\nq\n0\n");
        assert!(out.contains("Query cleared!"));
        assert!(draft.conditions.is_empty());
        assert_eq!(draft.columns, vec!["*"]);
        assert_eq!(draft.table, Some(Table::Events));
    }

    #[test]
    fn test_invalid_limit_and_magnitude_are_reported() {
        let (draft, out) = run("1\n7\n0\n\n3\n1\n4\n>=\n42\n\nq\n0\n");
        assert!(out.contains("LIMIT must be a positive integer"));
        assert!(out.contains("magnitude must be between 1 and 10, got 42"));
        assert!(draft.limit.is_none());
        assert!(draft.conditions.is_empty());
    }

    #[test]
    fn test_absolute_time_window() {
        let (draft, _) = run("1\n8\n2\n2024-01-01 00:00\n2024-01-02 00:00\nq\n0\n");
        assert_eq!(
            draft.time_window.clause().as_deref(),
            Some("START '2024-01-01 00:00' STOP '2024-01-02 00:00'")
        );

        let (draft, out) = run("1\n8\n2\nyesterday\n\n\nq\n0\n");
        assert!(draft.time_window.is_none());
        assert!(out.contains("'yesterday' is not a datetime"));
    }

    #[test]
    fn test_copy_without_clipboard_prints_query() {
        let (_, out) = run("1\nc\n\nq\n0\n");
        assert!(out.contains("Clipboard support is disabled"));
        assert!(out.contains("Query: SELECT * FROM events"));
    }

    #[test]
    fn test_modify_template() {
        let input = [
            "2", "6", "1",   // Investigation Queries > Activity by IP Address
            "m", "10.9.9.9", // placeholder
            "2",             // LAST 24 HOURS
            "",              // back
            "0", "0", "0",
        ]
        .join("\n");

        let (_, out) = run(&input);
        assert!(out.contains("Investigation Queries (4 queries)"));
        assert!(out.contains("MODIFIED QUERY:"));
        assert!(out.contains("WHERE sourceip = '10.9.9.9'\n   OR destinationip = '10.9.9.9'"));
        assert!(out.contains("LIMIT 1000\nLAST 24 HOURS"));
    }

    #[test]
    fn test_validate_screen() {
        let (_, out) = run("8\nSELECT * FORM events\n\n\n0\n");
        assert!(out.contains("VALIDATION RESULTS"));
        assert!(out.contains("Issues found:"));
        assert!(out.contains("Query is missing FROM clause"));
    }

    #[test]
    fn test_quick_query_joins_lines() {
        let (_, out) = run("7\nSELECT sourceip FROM events\nLAST 1 HOURS\n\n\n0\n");
        assert!(out.contains("Your query:\nSELECT sourceip FROM events LAST 1 HOURS"));
    }

    #[test]
    fn test_reference_screens() {
        let (_, out) = run("3\n2\n\n4\n2\n\n5\n\n6\n\n9\n\n0\n");
        assert!(out.contains("FLOW FIELDS"));
        assert!(out.contains("TRAFFIC VOLUME"));
        assert!(out.contains("AGGREGATION FUNCTIONS"));
        assert!(out.contains("Syntax: COUNT("));
        assert!(out.contains("STRING OPERATORS"));
        assert!(out.contains("WHERE eventcount BETWEEN 10 AND 100"));
        assert!(out.contains("PARSEDATETIME (Dynamic Time)"));
        assert!(out.contains("BASIC QUERY STRUCTURE:"));
    }

    #[test]
    fn test_pick_is_one_based() {
        assert_eq!(pick("1", &Table::ALL), Some(Table::Events));
        assert_eq!(pick("2", &Table::ALL), Some(Table::Flows));
        assert_eq!(pick("0", &Table::ALL), None);
        assert_eq!(pick("3", &Table::ALL), None);
        assert_eq!(pick("x", &Table::ALL), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, ,b ,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }
}
