//! Logging setup
//!
//! Installs a `tracing` subscriber built from [`LoggingConfig`]. `RUST_LOG`
//! takes precedence over the configured level when it is set.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Logging setup errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Filter directive used when `RUST_LOG` is unset
///
/// `extra` holds directives for other crates, e.g. `tower_http=debug`.
pub fn directive(config: &LoggingConfig, extra: &str) -> String {
    let level = config.level.trim();
    let level = if level.is_empty() { "info" } else { level };
    if extra.trim().is_empty() {
        format!("aql_builder={}", level)
    } else {
        format!("aql_builder={},{}", level, extra.trim())
    }
}

/// Install the global subscriber
///
/// Output goes to stderr, or to `config.file` when set. `format = "json"`
/// selects JSON lines; anything else gets the human-readable format.
pub fn init(config: &LoggingConfig, extra: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(config, extra)));

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_uses_configured_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(directive(&config, ""), "aql_builder=debug");
        assert_eq!(
            directive(&config, "tower_http=debug"),
            "aql_builder=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_directive_blank_level_falls_back() {
        let config = LoggingConfig {
            level: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(directive(&config, ""), "aql_builder=info");
    }

    #[test]
    fn test_unwritable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(dir.path().join("missing").join("log.txt").display().to_string()),
            ..Default::default()
        };
        assert!(matches!(init(&config, ""), Err(LoggingError::File { .. })));
    }
}
