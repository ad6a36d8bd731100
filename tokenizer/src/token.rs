//! Lexical tokens of a C-like translation unit

use diagnostics::{FileId, SourcePosition, SourceSpan};
use std::fmt;

/// Coarse lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword
    Name,
    /// Numeric literal, including suffixes (`10u`, `0x1f`, `1.5f`)
    Number,
    /// String literal with its quotes
    String,
    /// Character literal with its quotes
    Char,
    /// Operator or punctuation
    Punct,
}

/// A single token.
///
/// `var_id` is 0 unless the token names a declared variable; all references to
/// the same declaration share the same nonzero id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub var_id: u32,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        kind: TokenKind,
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            line,
            column,
            offset,
            var_id: 0,
        }
    }

    /// Build a token from bare text, guessing its kind. Used for hand-written
    /// token sequences in tests and tools.
    pub fn synthetic(text: &str, line: usize) -> Self {
        let kind = match text.chars().next() {
            Some(c) if c.is_ascii_digit() => TokenKind::Number,
            Some(c) if c.is_ascii_alphabetic() || c == '_' => TokenKind::Name,
            Some('"') => TokenKind::String,
            Some('\'') => TokenKind::Char,
            _ => TokenKind::Punct,
        };
        Self::new(text, kind, line, 1, 0)
    }

    pub fn with_var_id(mut self, var_id: u32) -> Self {
        self.var_id = var_id;
        self
    }

    /// Copy of this token with different text, keeping the source position.
    pub(crate) fn derived(&self, text: &str, kind: TokenKind) -> Self {
        Self::new(text, kind, self.line, self.column, self.offset)
    }

    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }

    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.offset)
    }

    pub fn span(&self, file_id: FileId) -> SourceSpan {
        SourceSpan::on_line(self.position(), self.text.len(), file_id)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Keywords that start statements or expressions and can never name a type
pub const NON_TYPE_KEYWORDS: &[&str] = &[
    "case", "return", "delete", "goto", "new", "sizeof", "throw", "else", "do",
];

/// Keywords that never name a variable
pub const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "delete", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "int", "long",
    "new", "register", "return", "short", "signed", "sizeof", "static", "struct",
    "switch", "throw", "typedef", "union", "unsigned", "void", "volatile", "while",
    "class", "bool",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub fn is_non_type_keyword(text: &str) -> bool {
    NON_TYPE_KEYWORDS.contains(&text)
}
