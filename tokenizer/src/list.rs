use diagnostics::{FileId, SourceSpan};

use crate::pattern::{Pattern, WindowMatch};
use crate::token::Token;

/// Ordered, read-only token sequence of one translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
    file_id: FileId,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>, file_id: FileId) -> Self {
        Self { tokens, file_id }
    }

    /// Wrap hand-built tokens, attributed to file 0
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self::new(tokens, FileId::new(0))
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn at(&self, index: usize) -> Option<TokenRef<'_>> {
        (index < self.tokens.len()).then_some(TokenRef { list: self, index })
    }

    pub fn first(&self) -> Option<TokenRef<'_>> {
        self.at(0)
    }

    /// Cursor over every token in order
    pub fn refs(&self) -> impl Iterator<Item = TokenRef<'_>> {
        (0..self.tokens.len()).map(move |index| TokenRef { list: self, index })
    }

    /// Source text of the sequence joined by single spaces
    pub fn joined(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A position inside a [`TokenList`] with neighbour navigation
#[derive(Debug, Clone, Copy)]
pub struct TokenRef<'a> {
    list: &'a TokenList,
    index: usize,
}

impl<'a> TokenRef<'a> {
    pub fn token(&self) -> &'a Token {
        &self.list.tokens[self.index]
    }

    pub fn list(&self) -> &'a TokenList {
        self.list
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn str(&self) -> &'a str {
        &self.token().text
    }

    pub fn is(&self, text: &str) -> bool {
        self.token().text == text
    }

    pub fn var_id(&self) -> u32 {
        self.token().var_id
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    pub fn span(&self) -> SourceSpan {
        self.token().span(self.list.file_id)
    }

    pub fn next(&self) -> Option<TokenRef<'a>> {
        self.list.at(self.index + 1)
    }

    pub fn prev(&self) -> Option<TokenRef<'a>> {
        self.index.checked_sub(1).and_then(|i| self.list.at(i))
    }

    /// Token `offset` positions away (negative looks backwards)
    pub fn tok_at(&self, offset: isize) -> Option<TokenRef<'a>> {
        let index = self.index.checked_add_signed(offset)?;
        self.list.at(index)
    }

    pub fn matches(&self, pattern: &Pattern) -> bool {
        pattern.matches(self.list, self.index)
    }

    pub fn match_pattern(&self, pattern: &Pattern) -> Option<WindowMatch<'a>> {
        pattern.match_at(self.list, self.index)
    }
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.index == other.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenList {
        TokenList::from_tokens(
            ["free", "(", "arr", ")", ";"]
                .iter()
                .map(|t| Token::synthetic(t, 2))
                .collect(),
        )
    }

    #[test]
    fn test_navigation() {
        let list = sample();
        let first = list.first().unwrap();
        assert_eq!(first.str(), "free");
        assert!(first.prev().is_none());
        assert_eq!(first.next().unwrap().str(), "(");
        assert_eq!(first.tok_at(2).unwrap().str(), "arr");
        assert_eq!(first.tok_at(4).unwrap().tok_at(-3).unwrap().str(), "(");
        assert!(first.tok_at(5).is_none());
        assert!(first.tok_at(-1).is_none());
    }

    #[test]
    fn test_refs_visit_every_token() {
        let list = sample();
        assert_eq!(list.refs().count(), 5);
        assert_eq!(list.joined(), "free ( arr ) ;");
        assert_eq!(list.at(4).unwrap().line(), 2);
    }
}
