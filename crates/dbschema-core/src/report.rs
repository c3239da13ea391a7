//! User-facing progress reporting.

use std::fmt;
use std::io::{self, Write};

/// Importance of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// A planned or executed statement, or a state notice.
    Info,
    /// A closing remark about what was (not) done.
    Comment,
    /// The run was aborted.
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Comment => "comment",
            Self::Error => "error",
        })
    }
}

/// Receives progress messages from the orchestrator.
pub trait Reporter {
    /// Reports one message.
    fn report(&mut self, message: &str, level: ReportLevel);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, message: &str, level: ReportLevel) {
        (**self).report(message, level);
    }
}

/// Writes messages line by line, errors to stderr and everything else to
/// stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, message: &str, level: ReportLevel) {
        // A closed pipe must not abort a schema update.
        let _ = match level {
            ReportLevel::Error => writeln!(io::stderr(), "{message}"),
            ReportLevel::Info | ReportLevel::Comment => writeln!(io::stdout(), "{message}"),
        };
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    messages: Vec<(ReportLevel, String)>,
}

impl RecordingReporter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages with their levels, in order.
    #[must_use]
    pub fn messages(&self) -> &[(ReportLevel, String)] {
        &self.messages
    }

    /// Messages reported at the given level.
    #[must_use]
    pub fn at(&self, level: ReportLevel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Returns whether a message was reported, at any level.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|(_, m)| m == message)
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, message: &str, level: ReportLevel) {
        self.messages.push((level, message.to_string()));
    }
}
