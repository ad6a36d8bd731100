//! Escape of auto variables through output parameters, `return &x` and `free`
//!
//! A single forward pass. Each token first updates the function scope, then
//! either extends the symbol classification or, when it starts no
//! declaration, is tested as a statement that may leak a local.

use diagnostics::DiagnosticSink;
use log::{debug, trace};
use tokenizer::{Pattern, Slot, TokenList, TokenRef};

use crate::classifier::SymbolClassification;
use crate::rules::{ASSIGN_TO_OUTPUT_PARAMETER, INVALID_DEALLOCATION, RETURN_ADDRESS_OF_AUTO};
use crate::scope::FunctionScanState;

const STATEMENT_START: &[&str] = &[";", "{", "}"];

/// `[;{}] *| %name% = & %var%`
const ASSIGN_ADDRESS: Pattern = Pattern::new(&[
    Slot::OneOf(STATEMENT_START),
    Slot::Opt(&["*"]),
    Slot::Name,
    Slot::Lit("="),
    Slot::Lit("&"),
    Slot::Var,
]);

/// `[;{}] %name% [ %any% ] = & %var%`
const ASSIGN_ELEMENT_ADDRESS: Pattern = Pattern::new(&[
    Slot::OneOf(STATEMENT_START),
    Slot::Name,
    Slot::Lit("["),
    Slot::Any,
    Slot::Lit("]"),
    Slot::Lit("="),
    Slot::Lit("&"),
    Slot::Var,
]);

/// `return & %var% ;`
const RETURN_ADDRESS: Pattern = Pattern::new(&[
    Slot::Lit("return"),
    Slot::Lit("&"),
    Slot::Var,
    Slot::Lit(";"),
]);

/// `free ( %var% ) ;`
const FREE_CALL: Pattern = Pattern::new(&[
    Slot::Lit("free"),
    Slot::Lit("("),
    Slot::Var,
    Slot::Lit(")"),
    Slot::Lit(";"),
]);

/// Report every place a function lets the address of one of its auto
/// variables outlive the call.
pub fn detect_auto_variable_escapes(tokens: &TokenList, sink: &mut dyn DiagnosticSink) {
    debug!(
        "auto variable escapes: scanning {} tokens of {}",
        tokens.len(),
        tokens.file_id()
    );

    let mut scope = FunctionScanState::new();
    let mut symbols = SymbolClassification::new();
    let mut findings = 0usize;

    for tok in tokens.refs() {
        if scope.advance(tok).resets_function() {
            symbols.clear();
        }

        if scope.in_parameter_list() {
            symbols.classify_parameter(tok);
            continue;
        }
        if !scope.in_body() || symbols.classify_local(tok).is_some() {
            continue;
        }

        if detect_escape(tok, &symbols, sink) {
            findings += 1;
        }
    }

    debug!("auto variable escapes: {} finding(s)", findings);
}

/// Test the statement at `tok` against the escape shapes, in order.
fn detect_escape(
    tok: TokenRef<'_>,
    symbols: &SymbolClassification,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let assignment = tok
        .match_pattern(&ASSIGN_ADDRESS)
        .and_then(|m| Some((m.token(2)?, m.token(3)?, m.token(5)?)))
        .or_else(|| {
            tok.match_pattern(&ASSIGN_ELEMENT_ADDRESS)
                .and_then(|m| Some((m.token(1)?, m.token(5)?, m.token(7)?)))
        });

    if let Some((target, assign, local)) = assignment {
        if symbols.is_output_parameter(target.str()) && symbols.is_auto_scalar(local.var_id()) {
            trace!(
                "`{}` escapes through `{}` at line {}",
                local.str(),
                target.str(),
                assign.line()
            );
            sink.report(ASSIGN_TO_OUTPUT_PARAMETER.diagnostic(
                assign,
                format!("address of `{}` stored into `{}`", local.str(), target.str()),
            ));
            return true;
        }
        return false;
    }

    if let Some(local) = tok.match_pattern(&RETURN_ADDRESS).and_then(|m| m.token(2)) {
        if symbols.is_auto_scalar(local.var_id()) {
            trace!("address of `{}` returned at line {}", local.str(), tok.line());
            sink.report(RETURN_ADDRESS_OF_AUTO.diagnostic(
                tok,
                format!("`{}` is a local variable", local.str()),
            ));
            return true;
        }
        return false;
    }

    if let Some(array) = tok.match_pattern(&FREE_CALL).and_then(|m| m.token(2)) {
        if symbols.is_auto_array(array.var_id()) {
            trace!("local array `{}` freed at line {}", array.str(), tok.line());
            sink.report(INVALID_DEALLOCATION.diagnostic(
                tok,
                format!("`{}` is a local array", array.str()),
            ));
            return true;
        }
    }

    false
}
