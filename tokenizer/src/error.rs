use diagnostics::{Diagnostic, DiagnosticBuilder, FileId, SourcePosition, SourceSpan};
use std::fmt;

/// Rule id used for tokenizer failures
pub const SYNTAX_ERROR: &str = "syntaxError";

/// What went wrong while lexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// `/*` without a matching `*/`
    UnterminatedComment,
    /// String literal not closed before end of line
    UnterminatedString,
    /// Character literal not closed before end of line
    UnterminatedChar,
}

/// Errors that can occur while turning source text into tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize, offset: usize) -> Self {
        Self { kind, line, column, offset }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            LexErrorKind::UnterminatedComment => "unterminated block comment",
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::UnterminatedChar => "unterminated character literal",
        }
    }

    /// Convert into a reportable diagnostic for the given file
    pub fn to_diagnostic(&self, file_id: FileId) -> Diagnostic {
        let pos = SourcePosition::new(self.line, self.column, self.offset);
        let span = SourceSpan::single_position(pos, file_id);
        let label = match self.kind {
            LexErrorKind::UnterminatedComment => "comment starts here",
            LexErrorKind::UnterminatedString | LexErrorKind::UnterminatedChar => {
                "literal starts here"
            }
        };

        DiagnosticBuilder::error(self.message(), span.clone())
            .code(SYNTAX_ERROR)
            .label(span, label)
            .help("the file was not analyzed")
            .build()
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message(), self.line, self.column)
    }
}

impl std::error::Error for LexError {}
