use std::fmt;

use crate::error::TemplateError;

/// How serious a recorded problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Output is still what the template most likely meant.
    Warning,
    /// Part of the output was dropped or replaced by an empty value.
    Error,
}

/// A recorded problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Where it came from: `templar`, or `templar:<name>` for a function or
    /// operator handler.
    pub origin:   String,
    /// The problem itself.
    pub error:    TemplateError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.origin, self.error)
    }
}

/// Collects the warnings and errors of parsing and rendering.
///
/// Template content never aborts the engine; problems land here instead and
/// are mirrored to `tracing` as they are recorded. Entries are kept until
/// [`take`](Self::take) drains them.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Records a warning. `name` is the function or operator the problem
    /// belongs to, or empty for the engine itself.
    pub fn warning(&mut self, name: &str, error: impl Into<TemplateError>) {
        self.record(Severity::Warning, name, error.into());
    }

    /// Records an error. `name` is the function or operator the problem
    /// belongs to, or empty for the engine itself.
    pub fn error(&mut self, name: &str, error: impl Into<TemplateError>) {
        self.record(Severity::Error, name, error.into());
    }

    fn record(&mut self, severity: Severity, name: &str, error: TemplateError) {
        let origin = if name.is_empty() {
            "templar".to_string()
        } else {
            format!("templar:{name}")
        };

        match severity {
            Severity::Warning => tracing::warn!(origin = %origin, "{error}"),
            Severity::Error => tracing::error!(origin = %origin, "{error}"),
        }

        self.entries.push(Diagnostic { severity,
                                       origin,
                                       error });
    }

    /// Returns everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if at least one error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}
