//! Token sequence facility for stacklint
//!
//! Turns C-like source text into a [`TokenList`]: lexing, declaration
//! simplification and symbol-id assignment, plus the cursor and compiled
//! window patterns checks query the list with.

pub mod error;
pub mod lexer;
pub mod list;
pub mod pattern;
pub mod simplify;
pub mod token;
pub mod varid;

use diagnostics::FileId;
use log::debug;

pub use error::{LexError, LexErrorKind, SYNTAX_ERROR};
pub use list::{TokenList, TokenRef};
pub use pattern::{Pattern, Slot, WindowMatch};
pub use token::{Token, TokenKind};

/// Tokenize one translation unit into an analysis-ready token list
pub fn tokenize(source: &str, file_id: FileId) -> Result<TokenList, LexError> {
    let raw = lexer::lex(source)?;
    let raw_len = raw.len();

    let mut tokens = simplify::simplify_declarations(raw);
    varid::assign_var_ids(&mut tokens);

    debug!(
        "tokenized {}: {} tokens ({} after simplification)",
        file_id,
        raw_len,
        tokens.len()
    );
    Ok(TokenList::new(tokens, file_id))
}

/// Tokenize a snippet attributed to file 0
pub fn tokenize_str(source: &str) -> Result<TokenList, LexError> {
    tokenize(source, FileId::new(0))
}
