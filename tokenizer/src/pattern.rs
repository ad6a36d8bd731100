//! Compiled token-window patterns
//!
//! A pattern is a fixed sequence of [`Slot`]s built at compile time:
//!
//! ```rust,ignore
//! const RETURN_ADDRESS: Pattern = Pattern::new(&[
//!     Slot::Lit("return"),
//!     Slot::Lit("&"),
//!     Slot::Var,
//!     Slot::Lit(";"),
//! ]);
//! ```
//!
//! Matching is anchored at one token and walks left to right. `Opt` slots
//! consume a token only when it matches and never backtrack.

use smallvec::SmallVec;
use std::fmt;

use crate::list::{TokenList, TokenRef};
use crate::token::{is_non_type_keyword, Token, TokenKind};

/// One element of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Exact token text
    Lit(&'static str),
    /// Any of the listed texts (`a|b|c`)
    OneOf(&'static [&'static str]),
    /// Any of the listed texts, or nothing (`a|b|`)
    Opt(&'static [&'static str]),
    /// `%type%`: an identifier without symbol id that is not a non-type keyword
    Type,
    /// `%var%`: a token carrying a nonzero symbol id
    Var,
    /// `%name%`: any identifier
    Name,
    /// `%any%`: exactly one token
    Any,
    /// `%num%`: a numeric literal
    Num,
}

impl Slot {
    fn accepts(&self, token: &Token) -> bool {
        match self {
            Slot::Lit(text) => token.text == *text,
            Slot::OneOf(texts) | Slot::Opt(texts) => texts.contains(&token.text.as_str()),
            Slot::Type => {
                token.kind == TokenKind::Name
                    && token.var_id == 0
                    && !is_non_type_keyword(&token.text)
            }
            Slot::Var => token.var_id != 0,
            Slot::Name => token.kind == TokenKind::Name,
            Slot::Any => true,
            Slot::Num => token.kind == TokenKind::Number,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Lit(text) => f.write_str(text),
            Slot::OneOf(texts) => f.write_str(&texts.join("|")),
            Slot::Opt(texts) => write!(f, "{}|", texts.join("|")),
            Slot::Type => f.write_str("%type%"),
            Slot::Var => f.write_str("%var%"),
            Slot::Name => f.write_str("%name%"),
            Slot::Any => f.write_str("%any%"),
            Slot::Num => f.write_str("%num%"),
        }
    }
}

/// A fixed-length token window pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    slots: &'static [Slot],
}

impl Pattern {
    pub const fn new(slots: &'static [Slot]) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &'static [Slot] {
        self.slots
    }

    /// Match the pattern with its first slot anchored at `index`
    pub fn match_at<'a>(&self, list: &'a TokenList, index: usize) -> Option<WindowMatch<'a>> {
        let mut positions = SmallVec::with_capacity(self.slots.len());
        let mut cursor = index;

        for slot in self.slots {
            let token = list.get(cursor);
            match slot {
                Slot::Opt(_) => {
                    if token.is_some_and(|t| slot.accepts(t)) {
                        positions.push(Some(cursor));
                        cursor += 1;
                    } else {
                        positions.push(None);
                    }
                }
                _ => {
                    if !slot.accepts(token?) {
                        return None;
                    }
                    positions.push(Some(cursor));
                    cursor += 1;
                }
            }
        }

        Some(WindowMatch { list, positions })
    }

    pub fn matches(&self, list: &TokenList, index: usize) -> bool {
        self.match_at(list, index).is_some()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// The tokens a successful match consumed, one entry per slot
#[derive(Debug, Clone)]
pub struct WindowMatch<'a> {
    list: &'a TokenList,
    positions: SmallVec<[Option<usize>; 8]>,
}

impl<'a> WindowMatch<'a> {
    /// Token consumed by slot `slot`; `None` for a skipped `Opt` slot
    pub fn token(&self, slot: usize) -> Option<TokenRef<'a>> {
        let index = (*self.positions.get(slot)?)?;
        self.list.at(index)
    }

    pub fn first(&self) -> Option<TokenRef<'a>> {
        self.positions.iter().flatten().next().and_then(|i| self.list.at(*i))
    }

    /// Index just past the last consumed token
    pub fn end(&self) -> Option<usize> {
        self.positions.iter().flatten().last().map(|i| i + 1)
    }
}
