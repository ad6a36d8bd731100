//! Declaration simplification
//!
//! Rewrites statement-level declarations into the canonical one-name form the
//! checks pattern-match against:
//!
//! ```text
//! int x = 2;          ->  int x ; x = 2 ;
//! int a, *b = &a;     ->  int a ; int * b ; b = & a ;
//! ```
//!
//! Anything that does not look like a plain declaration is copied unchanged.

use crate::token::{Token, TokenKind};

/// Keywords that cannot start a declaration statement
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "if", "else", "while", "for", "do", "switch", "case", "default", "goto",
    "break", "continue", "delete", "new", "sizeof", "throw", "typedef", "using",
];

/// A single declarator inside a declaration statement
struct Declarator {
    /// `*`/`&` markers, the name and any `[...]` suffixes
    head: std::ops::Range<usize>,
    /// Index of the declared name
    name: usize,
    /// Index of `=` and the initializer tokens after it
    init: Option<(usize, std::ops::Range<usize>)>,
}

struct Declaration {
    type_tokens: std::ops::Range<usize>,
    declarators: Vec<Declarator>,
    /// Index of the terminating `;`
    end: usize,
}

pub fn simplify_declarations(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut paren_depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let at_statement_start = paren_depth == 0
            && out
                .last()
                .map_or(true, |t: &Token| matches!(t.text.as_str(), ";" | "{" | "}"));

        if at_statement_start {
            if let Some(decl) = parse_declaration(&tokens, i) {
                if needs_rewrite(&decl) {
                    emit_declaration(&tokens, &decl, &mut out);
                    i = decl.end + 1;
                    continue;
                }
            }
        }

        match tokens[i].text.as_str() {
            "(" | "[" => paren_depth += 1,
            ")" | "]" => paren_depth = paren_depth.saturating_sub(1),
            _ => {}
        }
        out.push(tokens[i].clone());
        i += 1;
    }

    out
}

fn needs_rewrite(decl: &Declaration) -> bool {
    decl.declarators.len() > 1 || decl.declarators.iter().any(|d| d.init.is_some())
}

fn is_plain_name(token: &Token) -> bool {
    token.kind == TokenKind::Name
}

fn parse_declaration(tokens: &[Token], start: usize) -> Option<Declaration> {
    let first = tokens.get(start)?;
    if !is_plain_name(first) || STATEMENT_KEYWORDS.contains(&first.text.as_str()) {
        return None;
    }

    // Run of identifiers, possibly joined by `::`
    let mut j = start;
    while j < tokens.len() {
        if is_plain_name(&tokens[j]) {
            j += 1;
        } else if tokens[j].is("::") && tokens.get(j + 1).is_some_and(is_plain_name) {
            j += 2;
        } else {
            break;
        }
    }
    let run_end = j;
    let next = tokens.get(run_end)?;

    // Without a pointer marker the last identifier of the run is the name
    let type_end = if matches!(next.text.as_str(), "*" | "&") {
        run_end
    } else {
        run_end - 1
    };
    if type_end <= start || tokens[type_end - 1].is("::") {
        return None;
    }
    if tokens[start..type_end]
        .iter()
        .any(|t| STATEMENT_KEYWORDS.contains(&t.text.as_str()))
    {
        return None;
    }

    let mut declarators = Vec::new();
    let mut k = type_end;
    loop {
        let (declarator, after) = parse_declarator(tokens, k)?;
        declarators.push(declarator);
        match tokens.get(after)?.text.as_str() {
            "," => k = after + 1,
            ";" => {
                return Some(Declaration {
                    type_tokens: start..type_end,
                    declarators,
                    end: after,
                })
            }
            _ => return None,
        }
    }
}

/// Parse `*|&* name ([ ... ])* (= init)?`, returning the index after it
fn parse_declarator(tokens: &[Token], start: usize) -> Option<(Declarator, usize)> {
    let mut k = start;
    while tokens.get(k).is_some_and(|t| matches!(t.text.as_str(), "*" | "&" | "const")) {
        k += 1;
    }

    let name = k;
    if !tokens.get(name).is_some_and(is_plain_name) {
        return None;
    }
    k += 1;

    let mut is_array = false;
    while tokens.get(k).is_some_and(|t| t.is("[")) {
        is_array = true;
        k = skip_balanced(tokens, k)?;
    }
    let head = start..k;

    let init = if tokens.get(k).is_some_and(|t| t.is("=")) {
        // Aggregate initializers stay attached to their declaration
        if is_array {
            return None;
        }
        let eq = k;
        k += 1;
        let init_start = k;
        while let Some(t) = tokens.get(k) {
            match t.text.as_str() {
                "," | ";" => break,
                "(" | "[" | "{" => k = skip_balanced(tokens, k)?,
                ")" | "]" | "}" => return None,
                _ => k += 1,
            }
        }
        if k == init_start {
            return None;
        }
        Some((eq, init_start..k))
    } else {
        None
    };

    Some((Declarator { head, name, init }, k))
}

/// Given an opening bracket at `open`, return the index after its match
fn skip_balanced(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (k, t) in tokens.iter().enumerate().skip(open) {
        match t.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(k + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn emit_declaration(tokens: &[Token], decl: &Declaration, out: &mut Vec<Token>) {
    let semicolon = &tokens[decl.end];

    for declarator in &decl.declarators {
        out.extend(tokens[decl.type_tokens.clone()].iter().cloned());
        out.extend(tokens[declarator.head.clone()].iter().cloned());

        let Some((eq, init)) = &declarator.init else {
            out.push(semicolon.derived(";", TokenKind::Punct));
            continue;
        };

        let eq_token = &tokens[*eq];
        out.push(eq_token.derived(";", TokenKind::Punct));
        out.push(tokens[declarator.name].clone());
        out.push(eq_token.clone());
        out.extend(tokens[init.clone()].iter().cloned());
        out.push(semicolon.derived(";", TokenKind::Punct));
    }
}
