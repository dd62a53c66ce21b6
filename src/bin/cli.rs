//! AQL Builder CLI
//!
//! Non-interactive access to the builder:
//! - Assemble a query from flags
//! - Validate query text
//! - Browse and render templates
//! - Print reference data

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use aql_builder::catalog::{self, OperatorGroup};
use aql_builder::config::{generate_default_config, Config};
use aql_builder::query::{
    assemble, assemble_multiline, QueryDraft, SortDirection, Table, TimeWindow,
};
use aql_builder::templates;
use aql_builder::validator::{Finding, ValidationReport, Validator};

#[derive(Parser)]
#[command(name = "aql-builder-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, validate and look up QRadar AQL queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a query from clause parts
    Build {
        /// Table to query (events, flows)
        #[arg(short, long)]
        table: Option<Table>,
        /// SELECT columns (comma-separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,
        /// WHERE condition, joined with AND when repeated
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,
        /// GROUP BY columns
        #[arg(short, long, value_delimiter = ',')]
        group_by: Vec<String>,
        /// HAVING condition, joined with AND when repeated
        #[arg(long)]
        having: Vec<String>,
        /// ORDER BY columns
        #[arg(short, long, value_delimiter = ',')]
        order_by: Vec<String>,
        /// Sort direction (ASC, DESC)
        #[arg(long)]
        order: Option<SortDirection>,
        /// Maximum rows
        #[arg(short, long)]
        limit: Option<u32>,
        /// Relative window, e.g. "24 hours" or "LAST 7 DAYS"
        #[arg(long, conflicts_with = "start")]
        last: Option<String>,
        /// Absolute window start, e.g. "2024-01-01 00:00"
        #[arg(long)]
        start: Option<String>,
        /// Absolute window stop
        #[arg(long, requires = "start")]
        stop: Option<String>,
        /// Print one clause per line
        #[arg(short, long)]
        multiline: bool,
    },

    /// Validate query text (reads stdin when no query is given)
    Validate {
        query: Option<String>,
    },

    /// Browse query templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Print reference data
    Reference {
        #[command(subcommand)]
        command: ReferenceCommands,
    },

    /// Generate default configuration file
    Config {
        /// Output file (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List templates, optionally of one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one template
    Show { name: String },
    /// Fill a template's placeholders
    Render {
        name: String,
        /// Placeholder value in key=value format
        #[arg(short, long)]
        set: Vec<String>,
        /// Replace the time clause, e.g. "7 days"
        #[arg(long)]
        last: Option<String>,
    },
    /// Search names and descriptions
    Search { keyword: String },
}

#[derive(Subcommand)]
pub enum ReferenceCommands {
    /// Fields of a table
    Fields {
        #[arg(default_value = "events")]
        table: Table,
    },
    /// Function categories, or the functions of one category
    Functions { category: Option<String> },
    /// Operators by group
    Operators,
    /// Time clause forms
    Time,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = match cli.format.to_lowercase().as_str() {
        "text" => false,
        "json" => true,
        other => {
            eprintln!("Unknown output format: {} (use text or json)", other);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Build {
            table,
            select,
            conditions,
            group_by,
            having,
            order_by,
            order,
            limit,
            last,
            start,
            stop,
            multiline,
        } => {
            let config =
                Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
            let defaults = config.builder;

            let mut draft = QueryDraft::new(table.unwrap_or(defaults.default_table));
            if select.iter().all(|c| c.trim().is_empty()) {
                draft.set_columns(["*"]);
            } else {
                draft.set_columns(select);
            }
            for condition in conditions {
                draft.add_condition(condition);
            }
            draft.set_group_by(group_by);
            for condition in having {
                draft.add_having(condition);
            }
            draft.set_order_by(order_by, order.unwrap_or(defaults.default_order));

            if let Some(n) = limit {
                if let Err(e) = draft.set_limit(n) {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }

            let window = match (last, start) {
                (Some(text), _) => TimeWindow::parse(&text),
                (None, Some(start)) => TimeWindow::absolute(start, stop),
                (None, None) => Ok(TimeWindow::None),
            };
            match window {
                Ok(window) => draft.set_time_window(window),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }

            let (query, formatted) = match (assemble(&draft), assemble_multiline(&draft)) {
                (Ok(q), Ok(f)) => (q, f),
                (Err(e), _) | (_, Err(e)) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            let report = Validator::default().validate(&query);

            if json {
                let body = serde_json::json!({
                    "query": query,
                    "formatted": formatted,
                    "valid": report.is_valid(),
                    "findings": report.findings,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", if multiline { &formatted } else { &query });
                // stdout carries only the query
                for finding in &report.findings {
                    eprintln!("{}", finding);
                }
            }
        }

        Commands::Validate { query } => {
            let query = match query {
                Some(q) => q,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read query from stdin")?;
                    strip_line_ending(&buf).to_string()
                }
            };

            let report = Validator::default().validate(&query);
            if json {
                let body = serde_json::json!({
                    "valid": report.is_valid(),
                    "error_count": report.error_count(),
                    "warning_count": report.warning_count(),
                    "suggestion_count": report.suggestion_count(),
                    "findings": report.findings,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_report(&report);
            }

            if !report.is_valid() {
                std::process::exit(1);
            }
        }

        Commands::Templates { command } => match command {
            TemplateCommands::List { category } => {
                let entries: Vec<_> = match category.as_deref() {
                    Some(c) => templates::list_templates(c),
                    None => templates::all_templates().iter().collect(),
                };
                if entries.is_empty() {
                    eprintln!("No templates found");
                    std::process::exit(1);
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else {
                    let mut current = "";
                    for t in entries {
                        if t.category != current {
                            current = t.category;
                            println!("\n{}", current);
                        }
                        println!("  {:<36} {}", t.name, t.description);
                    }
                }
            }

            TemplateCommands::Show { name } => {
                let Some(t) = templates::get_template(&name) else {
                    eprintln!("Template not found: {}", name);
                    std::process::exit(1);
                };

                if json {
                    println!("{}", serde_json::to_string_pretty(t)?);
                } else {
                    println!("{} ({})", t.name, t.category);
                    println!("{}", t.description);
                    println!();
                    println!("{}", t.query);
                    if !t.params.is_empty() {
                        println!();
                        println!("Parameters: {}", t.params.join(", "));
                    }
                }
            }

            TemplateCommands::Render { name, set, last } => {
                let Some(t) = templates::get_template(&name) else {
                    eprintln!("Template not found: {}", name);
                    std::process::exit(1);
                };

                let mut values = Vec::new();
                for pair in &set {
                    match pair.split_once('=') {
                        Some((k, v)) => values.push((k.trim(), v)),
                        None => {
                            eprintln!("Expected key=value, got: {}", pair);
                            std::process::exit(1);
                        }
                    }
                }

                let mut query = t.render(values);
                if let Some(text) = last {
                    match TimeWindow::parse(&text) {
                        Ok(window) => query = templates::with_time_window(&query, &window),
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(1);
                        }
                    }
                }
                let unfilled = templates::placeholders(&query);

                if json {
                    let body = serde_json::json!({
                        "name": t.name,
                        "query": query,
                        "unfilled": unfilled,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    println!("{}", query);
                    if !unfilled.is_empty() {
                        eprintln!("Unfilled placeholders: {}", unfilled.join(", "));
                    }
                }
            }

            TemplateCommands::Search { keyword } => {
                let found = templates::search_templates(&keyword);
                if found.is_empty() {
                    eprintln!("No templates match '{}'", keyword);
                    std::process::exit(1);
                }

                if json {
                    let entries: Vec<_> = found.iter().map(|(_, t)| t).collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else {
                    for (category, t) in found {
                        println!("[{}] {}: {}", category, t.name, t.description);
                    }
                }
            }
        },

        Commands::Reference { command } => match command {
            ReferenceCommands::Fields { table } => {
                let fields = catalog::list_fields(table);
                if json {
                    println!("{}", serde_json::to_string_pretty(fields)?);
                } else {
                    println!("{} - {}", table, table.description());
                    for f in fields {
                        println!(
                            "  {:<28} {:<10} {}",
                            f.name,
                            f.data_type.unwrap_or(""),
                            f.description
                        );
                    }
                }
            }

            ReferenceCommands::Functions { category: None } => {
                let categories = catalog::function_categories();
                if json {
                    let body: Vec<_> = categories
                        .iter()
                        .map(|c| serde_json::json!({"name": c.label, "slug": c.slug, "count": c.functions.len()}))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    for c in categories {
                        println!("  {:<16} {:<16} {} functions", c.slug, c.label, c.functions.len());
                    }
                }
            }

            ReferenceCommands::Functions {
                category: Some(category),
            } => {
                let functions = catalog::list_functions(&category);
                if functions.is_empty() {
                    eprintln!("Unknown function category: {}", category);
                    std::process::exit(1);
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(functions)?);
                } else {
                    for f in functions {
                        println!("  {:<24} {}", f.name, f.description);
                        if let Some(example) = f.example {
                            println!("  {:<24} e.g. {}", "", example);
                        }
                    }
                }
            }

            ReferenceCommands::Operators => {
                if json {
                    let body: serde_json::Map<_, _> = OperatorGroup::ALL
                        .iter()
                        .map(|g| {
                            (
                                g.as_str().to_string(),
                                serde_json::json!(catalog::operators_in(*g)),
                            )
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    for group in OperatorGroup::ALL {
                        println!("\n{}", group.as_str());
                        for op in catalog::operators_in(group) {
                            println!("  {:<16} {}", op.name, op.description);
                        }
                    }
                }
            }

            ReferenceCommands::Time => {
                let clauses = catalog::list_time_clauses();
                if json {
                    println!("{}", serde_json::to_string_pretty(clauses)?);
                } else {
                    for c in clauses {
                        println!("  {:<14} {:<60} {}", c.kind, c.example, c.description);
                    }
                }
            }
        },

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, &config)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Configuration written to {:?}", path);
            } else {
                println!("{}", config);
            }
        }
    }

    Ok(())
}

/// Drop the single line ending a shell pipe leaves on the text
fn strip_line_ending(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

fn print_report(report: &ValidationReport) {
    if report.findings.is_empty() {
        println!("No issues found.");
        return;
    }

    for finding in &report.findings {
        print_finding(finding);
    }
    println!();
    println!(
        "{} error(s), {} warning(s), {} suggestion(s)",
        report.error_count(),
        report.warning_count(),
        report.suggestion_count()
    );
}

fn print_finding(finding: &Finding) {
    println!("{}", finding);
    if let Some(excerpt) = &finding.excerpt {
        println!("    near: {}", excerpt);
    }
}
