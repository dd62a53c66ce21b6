//! System clipboard through external tools
//!
//! The first tool that can be spawned receives the text on stdin.

use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Tools tried in order: program and arguments
const TOOLS: [(&str, &[&str]); 3] = [
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard support is disabled")]
    Disabled,

    #[error("Clipboard tools not available (install xclip or xsel)")]
    Unavailable,

    #[error("Could not copy to clipboard: {0}")]
    Io(#[from] io::Error),
}

/// Copies text with whichever clipboard tool is installed
#[derive(Debug, Clone, Copy)]
pub struct Clipboard {
    enabled: bool,
}

impl Clipboard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Copy `text`, returning the name of the tool that took it
    pub fn copy(&self, text: &str) -> Result<&'static str, ClipboardError> {
        if !self.enabled {
            return Err(ClipboardError::Disabled);
        }

        for (program, args) in TOOLS {
            let mut child = match Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => child,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let status = feed(&mut child, text)?;
            if status.success() {
                tracing::debug!(tool = program, bytes = text.len(), "Copied query to clipboard");
                return Ok(program);
            }
            tracing::debug!(tool = program, %status, "Clipboard tool failed");
        }

        Err(ClipboardError::Unavailable)
    }
}

/// Write `text` to the child's stdin, then wait for it to exit
///
/// The child is reaped even when the write fails.
fn feed(child: &mut Child, text: &str) -> io::Result<ExitStatus> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written.map(|()| status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_clipboard_never_spawns() {
        let clipboard = Clipboard::new(false);
        assert!(!clipboard.is_enabled());
        assert!(matches!(
            clipboard.copy("SELECT * FROM events"),
            Err(ClipboardError::Disabled)
        ));
    }

    #[cfg(unix)]
    fn spawn_piped(program: &str) -> Child {
        Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_feed_passes_text_through() {
        let mut child = spawn_piped("cat");
        let status = feed(&mut child, "SELECT * FROM events").unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_feed_reaps_child_on_broken_pipe() {
        // `true` never reads, so a write larger than the pipe buffer fails
        let mut child = spawn_piped("true");
        let text = "x".repeat(4 * 1024 * 1024);

        let err = feed(&mut child, &text).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(child.stdin.is_none());
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ClipboardError::Unavailable.to_string(),
            "Clipboard tools not available (install xclip or xsel)"
        );
    }
}
