//! Pointer-returning functions that return one of their own arrays
//!
//! Independent of the escape pass: it only looks at functions whose
//! signature reads `type * name (` and only remembers arrays.

use diagnostics::DiagnosticSink;
use log::{debug, trace};
use smallvec::SmallVec;
use tokenizer::{Pattern, Slot, TokenList, TokenRef};

use crate::rules::RETURN_LOCAL_ARRAY;

/// `%type% * %name% (`
const POINTER_FUNCTION: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Lit("*"),
    Slot::Name,
    Slot::Lit("("),
]);

/// `%type% * %name% :: %name% (`
const POINTER_MEMBER_FUNCTION: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Lit("*"),
    Slot::Name,
    Slot::Lit("::"),
    Slot::Name,
    Slot::Lit("("),
]);

/// `[;{}] %type% %var% [`
const ARRAY_DECLARATION: Pattern = Pattern::new(&[
    Slot::OneOf(&[";", "{", "}"]),
    Slot::Type,
    Slot::Var,
    Slot::Lit("["),
]);

/// `return %var% ;`
const RETURN_VARIABLE: Pattern = Pattern::new(&[
    Slot::Lit("return"),
    Slot::Var,
    Slot::Lit(";"),
]);

/// Body of the pointer-returning function being scanned
#[derive(Debug, Default)]
struct PointerFunction {
    depth: usize,
    arrays: SmallVec<[u32; 8]>,
}

/// Report `return arr;` where `arr` is an array local to a function that
/// returns a pointer.
pub fn detect_local_array_pointer_returns(tokens: &TokenList, sink: &mut dyn DiagnosticSink) {
    debug!(
        "local array returns: scanning {} tokens of {}",
        tokens.len(),
        tokens.file_id()
    );

    let mut function: Option<PointerFunction> = None;
    let mut findings = 0usize;
    let mut index = 0;

    while let Some(tok) = tokens.at(index) {
        let Some(body) = function.as_mut() else {
            index = match body_start(tok) {
                Some(BodyStart::Body(open_brace)) => {
                    trace!("pointer function `{}` at line {}", tok.str(), tok.line());
                    function = Some(PointerFunction::default());
                    open_brace
                }
                Some(BodyStart::Prototype(after)) => after,
                None => index + 1,
            };
            continue;
        };

        if tok.is("{") {
            body.depth += 1;
        } else if tok.is("}") {
            body.depth = body.depth.saturating_sub(1);
            if body.depth == 0 {
                function = None;
                index += 1;
                continue;
            }
        }

        if let Some(array) = tok.match_pattern(&ARRAY_DECLARATION).and_then(|m| m.token(2)) {
            trace!("local array `{}` at line {}", array.str(), array.line());
            body.arrays.push(array.var_id());
        }

        if let Some(var) = tok.match_pattern(&RETURN_VARIABLE).and_then(|m| m.token(1)) {
            if body.arrays.contains(&var.var_id()) {
                sink.report(RETURN_LOCAL_ARRAY.diagnostic(
                    tok,
                    format!("`{}` is a local array", var.str()),
                ));
                findings += 1;
            }
        }

        index += 1;
    }

    debug!("local array returns: {} finding(s)", findings);
}

enum BodyStart {
    /// Index of the `{` opening the body
    Body(usize),
    /// Index just past a parameter list with no body
    Prototype(usize),
}

fn body_start(tok: TokenRef<'_>) -> Option<BodyStart> {
    let m = tok
        .match_pattern(&POINTER_FUNCTION)
        .or_else(|| tok.match_pattern(&POINTER_MEMBER_FUNCTION))?;
    let open_paren = m.end()?.checked_sub(1)?;
    let after = matching_paren(tok.list(), open_paren)? + 1;

    match tok.list().at(after) {
        Some(next) if next.is("{") => Some(BodyStart::Body(after)),
        _ => Some(BodyStart::Prototype(after)),
    }
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(tokens: &TokenList, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.tokens().iter().enumerate().skip(open) {
        match token.text.as_str() {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnostics::Diagnostic;
    use tokenizer::tokenize_str;

    fn run(source: &str) -> Vec<Diagnostic> {
        let tokens = tokenize_str(source).unwrap();
        let mut findings = Vec::new();
        detect_local_array_pointer_returns(&tokens, &mut findings);
        findings
    }

    #[test]
    fn test_returned_array() {
        let findings = run("int *f()\n{\n    int a[10];\n    return a;\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line(), 4);
        assert_eq!(findings[0].rule_id(), Some("returnLocalVariable"));
        assert_eq!(findings[0].message, "Returning pointer to local array variable");
    }

    #[test]
    fn test_member_function() {
        assert_eq!(
            run("char *Buffer::data(int n) { char tmp[32]; return tmp; }").len(),
            1
        );
    }

    #[test]
    fn test_scalar_return_is_ignored() {
        assert!(run("int *f() { int *p; return p; }").is_empty());
    }

    #[test]
    fn test_non_pointer_function_is_ignored() {
        assert!(run("int f() { int a[10]; return a; }").is_empty());
    }

    #[test]
    fn test_prototype_does_not_open_body() {
        assert!(run("int *f(void); void g() { int a[2]; return a; }").is_empty());
    }

    #[test]
    fn test_arrays_do_not_leak_between_functions() {
        let source = "int *f() { int a[4]; return 0; }\nint *g(int *a) { return a; }";
        assert!(run(source).is_empty());
    }

    #[test]
    fn test_unterminated_body() {
        assert_eq!(run("int *f() { int a[4]; return a;").len(), 1);
    }
}
