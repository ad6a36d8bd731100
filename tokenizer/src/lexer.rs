//! nom lexer for C-like sources
//!
//! Produces a flat token vector. The lexer is deliberately forgiving: any
//! character it does not recognise becomes a one-character punctuator, so only
//! unterminated comments and literals abort tokenization.

use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_until, take_while},
    character::complete::{multispace1, satisfy},
    combinator::{recognize, value},
    multi::many0,
    IResult, Parser,
};
use nom_locate::LocatedSpan;

use crate::error::{LexError, LexErrorKind};
use crate::token::{Token, TokenKind};

pub type Span<'a> = LocatedSpan<&'a str>;

type LResult<'a, T> = IResult<Span<'a>, T>;

/// Multi-character punctuators, longest first
const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=", "...", "::", "->", "++", "--", "==", "!=", "<=", ">=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>",
];

/// Tokenize a whole source text
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut input = Span::new(source);
    let mut tokens = Vec::new();

    loop {
        input = skip_trivia(input)?;
        if input.fragment().is_empty() {
            break;
        }

        let (rest, token) = next_token(input)?;
        tokens.push(token);
        input = rest;
    }

    Ok(tokens)
}

fn error_at(input: Span, kind: LexErrorKind) -> LexError {
    LexError::new(
        kind,
        input.location_line() as usize,
        input.get_utf8_column(),
        input.location_offset(),
    )
}

/// Skip whitespace, comments and preprocessor lines
fn skip_trivia(input: Span) -> Result<Span, LexError> {
    let rest = match ws(input) {
        Ok((rest, ())) => rest,
        Err(_) => input,
    };

    if rest.fragment().starts_with("/*") {
        return Err(error_at(rest, LexErrorKind::UnterminatedComment));
    }
    Ok(rest)
}

fn ws(input: Span) -> LResult<()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), line_comment),
            value((), block_comment),
            value((), directive),
        ))),
    )
    .parse(input)
}

/// Line comment: // comment
fn line_comment(input: Span) -> LResult<Span> {
    recognize((tag("//"), take_while(|c: char| c != '\n'))).parse(input)
}

/// Block comment: /* comment */
fn block_comment(input: Span) -> LResult<Span> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

/// Preprocessor directive up to the end of the line, following `\` continuations
fn directive(input: Span) -> LResult<Span> {
    let fragment = input.fragment();
    if !fragment.starts_with('#') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut len = 0usize;
    let mut chars = fragment.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\n') {
            chars.next();
            len += 2;
            continue;
        }
        if c == '\n' {
            break;
        }
        len += 1;
    }

    take(len).parse(input)
}

fn identifier(input: Span) -> LResult<Span> {
    recognize((
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn number(input: Span) -> LResult<Span> {
    recognize((
        satisfy(|c: char| c.is_ascii_digit()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_'),
    ))
    .parse(input)
}

fn punctuator(input: Span) -> LResult<Span> {
    let fragment = input.fragment();
    let len = PUNCTUATORS
        .iter()
        .find(|p| fragment.starts_with(**p))
        .map(|p| p.len())
        .unwrap_or(1);
    take(len).parse(input)
}

/// Length in chars of a quoted literal, or None if it is not closed on its line
fn quoted_len(fragment: &str, quote: char) -> Option<usize> {
    let mut chars = fragment.chars();
    if chars.next() != Some(quote) {
        return None;
    }

    let mut len = 1;
    while let Some(c) = chars.next() {
        len += 1;
        match c {
            '\\' => match chars.next() {
                Some('\n') | None => return None,
                Some(_) => len += 1,
            },
            '\n' => return None,
            c if c == quote => return Some(len),
            _ => {}
        }
    }
    None
}

fn literal(input: Span, quote: char) -> Result<(Span, Span), LexError> {
    let kind = if quote == '"' {
        LexErrorKind::UnterminatedString
    } else {
        LexErrorKind::UnterminatedChar
    };
    let len = quoted_len(input.fragment(), quote).ok_or_else(|| error_at(input, kind))?;
    let (rest, text) = take::<usize, Span, nom::error::Error<Span>>(len)
        .parse(input)
        .map_err(|_| error_at(input, kind))?;
    Ok((rest, text))
}

fn make_token(span: Span, kind: TokenKind) -> Token {
    Token::new(
        *span.fragment(),
        kind,
        span.location_line() as usize,
        span.get_utf8_column(),
        span.location_offset(),
    )
}

fn next_token(input: Span) -> Result<(Span, Token), LexError> {
    let first = input.fragment().chars().next();

    let result = match first {
        Some('"') => {
            let (rest, text) = literal(input, '"')?;
            return Ok((rest, make_token(text, TokenKind::String)));
        }
        Some('\'') => {
            let (rest, text) = literal(input, '\'')?;
            return Ok((rest, make_token(text, TokenKind::Char)));
        }
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            identifier(input).map(|(rest, s)| (rest, make_token(s, TokenKind::Name)))
        }
        Some(c) if c.is_ascii_digit() => {
            number(input).map(|(rest, s)| (rest, make_token(s, TokenKind::Number)))
        }
        _ => punctuator(input).map(|(rest, s)| (rest, make_token(s, TokenKind::Punct))),
    };

    // Every branch above consumes at least one char of non-empty input
    result.map_err(|_| error_at(input, LexErrorKind::UnterminatedComment))
}
