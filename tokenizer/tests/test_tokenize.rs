//! End-to-end tokenizer tests: lexing, simplification and symbol ids together

use tokenizer::{tokenize_str, LexErrorKind, SYNTAX_ERROR};

#[test]
fn test_initialized_local_is_split_and_ided() {
    let tokens = tokenize_str("void f(int **res) { int num = 2; *res = &num; }").unwrap();
    assert_eq!(
        tokens.joined(),
        "void f ( int * * res ) { int num ; num = 2 ; * res = & num ; }"
    );

    let nums: Vec<u32> = tokens
        .iter()
        .filter(|t| t.text == "num")
        .map(|t| t.var_id)
        .collect();
    assert_eq!(nums.len(), 3);
    assert!(nums.iter().all(|id| *id == nums[0] && *id != 0));

    let res: Vec<u32> = tokens
        .iter()
        .filter(|t| t.text == "res")
        .map(|t| t.var_id)
        .collect();
    assert_eq!(res[0], res[1]);
    assert_ne!(res[0], nums[0]);
}

#[test]
fn test_ids_are_unique_per_declaration() {
    let tokens = tokenize_str("int g; void f() { int g; g = 1; } void h() { g = 2; }").unwrap();
    let ids: Vec<u32> = tokens
        .iter()
        .filter(|t| t.text == "g")
        .map(|t| t.var_id)
        .collect();

    assert_eq!(ids.len(), 4);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(ids[1], ids[2]);
    assert_eq!(ids[3], ids[0]);
}

#[test]
fn test_lex_error_becomes_diagnostic() {
    let err = tokenize_str("int f() {\n  /* never closed\n}").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedComment);

    let diagnostic = err.to_diagnostic(diagnostics::FileId::new(3));
    assert_eq!(diagnostic.rule_id(), Some(SYNTAX_ERROR));
    assert_eq!(diagnostic.line(), 2);
    assert_eq!(diagnostic.span.file_id, diagnostics::FileId::new(3));
}
