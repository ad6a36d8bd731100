//! Diagnostics for stacklint findings
//!
//! This library provides:
//! - Severity levels (Error, Warning, Info, Hint)
//! - Findings carrying a rule id, a fixed message and a source span
//! - The `DiagnosticSink` trait checks report into
//! - A terminal formatter with source snippets and optional colors

use std::fmt;

// Re-export source mapping types from the source_map crate
pub use source_map::{FileId, SourceFile, SourceMap, SourcePosition, SourceSpan};

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
    Hint,
}

impl DiagnosticSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Hint => "hint",
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label printed after the caret underline of its finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
}

impl Label {
    pub fn new(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A single finding. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: Option<String>,
    pub message: String,
    pub span: SourceSpan,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Rule id the finding was raised under (e.g. `autoVariables`)
    pub fn rule_id(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.column
    }
}

/// Receiver for findings produced by checks.
///
/// Reports arrive in scan order; a sink must not reorder or merge them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Findings raised under a given rule id
    pub fn with_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.rule_id() == Some(rule_id))
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Builder for creating diagnostics
pub struct DiagnosticBuilder {
    severity: DiagnosticSeverity,
    code: Option<String>,
    message: String,
    span: SourceSpan,
    labels: Vec<Label>,
    notes: Vec<String>,
    help: Vec<String>,
}

impl DiagnosticBuilder {
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            span,
            labels: vec![],
            notes: vec![],
            help: vec![],
        }
    }

    pub fn error(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(DiagnosticSeverity::Error, message, span)
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn label(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn help(mut self, help_msg: impl Into<String>) -> Self {
        self.help.push(help_msg.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            message: self.message,
            span: self.span,
            labels: self.labels,
            notes: self.notes,
            help: self.help,
        }
    }
}

/// Formatter for displaying diagnostics
pub struct ErrorFormatter {
    use_colors: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self { use_colors: false }
    }

    pub fn with_colors() -> Self {
        Self { use_colors: true }
    }

    pub fn format_diagnostics<'a>(
        &self,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
        source_map: &SourceMap,
    ) -> String {
        let mut output = String::new();

        for (i, diagnostic) in diagnostics.into_iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&self.format_diagnostic(diagnostic, source_map));
        }

        output
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic, source_map: &SourceMap) -> String {
        let mut output = String::new();

        // Header
        if self.use_colors {
            let color = match diagnostic.severity {
                DiagnosticSeverity::Error => "\x1b[31m",
                DiagnosticSeverity::Warning => "\x1b[33m",
                DiagnosticSeverity::Info => "\x1b[36m",
                DiagnosticSeverity::Hint => "\x1b[32m",
            };
            output.push_str(color);
            output.push_str(diagnostic.severity.as_str());
            if let Some(code) = &diagnostic.code {
                output.push_str(&format!("[{}]", code));
            }
            output.push_str("\x1b[0m: \x1b[1;97m");
            output.push_str(&diagnostic.message);
            output.push_str("\x1b[0m\n");
        } else {
            output.push_str(diagnostic.severity.as_str());
            if let Some(code) = &diagnostic.code {
                output.push_str(&format!("[{}]", code));
            }
            output.push_str(&format!(": {}\n", diagnostic.message));
        }

        let Some(file) = source_map.get_file(diagnostic.span.file_id) else {
            return output;
        };

        let arrow = if self.use_colors { "\x1b[96m-->\x1b[0m" } else { "-->" };
        let bar = if self.use_colors { "\x1b[96m|\x1b[0m" } else { "|" };

        output.push_str(&format!(
            "  {} {}:{}:{}\n",
            arrow, file.name, diagnostic.span.start.line, diagnostic.span.start.column
        ));

        let line_num = diagnostic.span.start.line;
        let width = line_num.to_string().len();

        if let Some(line) = file.get_line(line_num) {
            output.push_str(&format!("{:width$} {}\n", "", bar, width = width));
            output.push_str(&format!("{} {} {}\n", line_num, bar, line));

            let padding = " ".repeat(diagnostic.span.start.column.saturating_sub(1));
            let underline_len = if diagnostic.span.start.line == diagnostic.span.end.line {
                diagnostic
                    .span
                    .end
                    .column
                    .saturating_sub(diagnostic.span.start.column)
            } else {
                line.len()
                    .saturating_sub(diagnostic.span.start.column.saturating_sub(1))
            };
            let carets = "^".repeat(underline_len.max(1));
            let underline = if self.use_colors {
                format!("\x1b[31m{}\x1b[0m", carets)
            } else {
                carets
            };

            output.push_str(&format!(
                "{:width$} {} {}{}",
                "",
                bar,
                padding,
                underline,
                width = width
            ));

            if let Some(label) = diagnostic.labels.first() {
                output.push(' ');
                output.push_str(&label.message);
            }
            output.push('\n');
        }

        for help_msg in &diagnostic.help {
            if self.use_colors {
                output.push_str(&format!("     \x1b[32mhelp\x1b[0m: {}\n", help_msg));
            } else {
                output.push_str(&format!("     help: {}\n", help_msg));
            }
        }

        for note in &diagnostic.notes {
            if self.use_colors {
                output.push_str(&format!("\x1b[34mnote\x1b[0m: {}\n", note));
            } else {
                output.push_str(&format!("note: {}\n", note));
            }
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
