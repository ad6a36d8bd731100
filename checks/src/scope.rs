//! Function scope tracking over a flat token stream
//!
//! ```text
//!            signature              (...)   `{`
//!  Outside ───────────▶ Declaring ───────▶ InBody { depth }
//!     ▲                     │ other token        │ depth == 0
//!     └─────────────────────┴────────────────────┘
//! ```
//!
//! Only one function is tracked at a time. A signature seen while already
//! inside a function is ordinary body text.

use log::trace;
use tokenizer::{Pattern, Slot, TokenRef};

/// `%type% *|::| %name% (`
pub const FUNCTION_SIGNATURE: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Opt(&["*", "::"]),
    Slot::Name,
    Slot::Lit("("),
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    Outside,
    /// Between the signature and the body. `paren_depth` counts open
    /// parentheses of the parameter list; `params_closed` is set once the
    /// outermost one has been closed.
    Declaring {
        paren_depth: usize,
        params_closed: bool,
    },
    InBody {
        depth: usize,
    },
}

/// What a single token did to the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEvent {
    Unchanged,
    FunctionEntered,
    BodyEntered,
    FunctionExited,
    /// The signature was not followed by a body
    Abandoned,
}

impl ScopeEvent {
    /// Whether per-function state must be discarded
    pub fn resets_function(self) -> bool {
        matches!(
            self,
            ScopeEvent::FunctionEntered | ScopeEvent::FunctionExited | ScopeEvent::Abandoned
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionScanState {
    phase: ScanPhase,
}

impl FunctionScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn in_function(&self) -> bool {
        self.phase != ScanPhase::Outside
    }

    pub fn in_parameter_list(&self) -> bool {
        matches!(self.phase, ScanPhase::Declaring { paren_depth, .. } if paren_depth > 0)
    }

    pub fn in_body(&self) -> bool {
        matches!(self.phase, ScanPhase::InBody { .. })
    }

    /// Unmatched `{` since the body opened
    pub fn brace_depth(&self) -> usize {
        match self.phase {
            ScanPhase::InBody { depth } => depth,
            _ => 0,
        }
    }

    /// Feed the next token
    pub fn advance(&mut self, tok: TokenRef<'_>) -> ScopeEvent {
        match self.phase {
            ScanPhase::Outside => self.try_enter(tok),
            ScanPhase::Declaring {
                paren_depth,
                params_closed,
            } => {
                if tok.is("(") && !params_closed {
                    self.phase = ScanPhase::Declaring {
                        paren_depth: paren_depth + 1,
                        params_closed,
                    };
                    ScopeEvent::Unchanged
                } else if tok.is(")") && paren_depth > 0 {
                    self.phase = ScanPhase::Declaring {
                        paren_depth: paren_depth - 1,
                        params_closed: paren_depth == 1,
                    };
                    ScopeEvent::Unchanged
                } else if params_closed {
                    if tok.is("{") {
                        trace!("function body opens at line {}", tok.line());
                        self.phase = ScanPhase::InBody { depth: 1 };
                        return ScopeEvent::BodyEntered;
                    }
                    trace!("signature without body ends at line {}", tok.line());
                    self.phase = ScanPhase::Outside;
                    match self.try_enter(tok) {
                        ScopeEvent::FunctionEntered => ScopeEvent::FunctionEntered,
                        _ => ScopeEvent::Abandoned,
                    }
                } else {
                    ScopeEvent::Unchanged
                }
            }
            ScanPhase::InBody { depth } => {
                if tok.is("{") {
                    self.phase = ScanPhase::InBody { depth: depth + 1 };
                } else if tok.is("}") {
                    if depth <= 1 {
                        trace!("function body closes at line {}", tok.line());
                        self.phase = ScanPhase::Outside;
                        return ScopeEvent::FunctionExited;
                    }
                    self.phase = ScanPhase::InBody { depth: depth - 1 };
                }
                ScopeEvent::Unchanged
            }
        }
    }

    fn try_enter(&mut self, tok: TokenRef<'_>) -> ScopeEvent {
        if tok.matches(&FUNCTION_SIGNATURE) {
            trace!("function signature `{}` at line {}", tok.str(), tok.line());
            self.phase = ScanPhase::Declaring {
                paren_depth: 0,
                params_closed: false,
            };
            ScopeEvent::FunctionEntered
        } else {
            ScopeEvent::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenizer::{tokenize_str, TokenList};

    fn events(tokens: &TokenList) -> Vec<(String, ScopeEvent, ScanPhase)> {
        let mut scope = FunctionScanState::new();
        tokens
            .refs()
            .map(|tok| {
                let event = scope.advance(tok);
                (tok.str().to_string(), event, scope.phase())
            })
            .collect()
    }

    #[test]
    fn test_function_lifecycle() {
        let tokens = tokenize_str("int f(int a) { if (a) { a = 1; } }").unwrap();
        let trace = events(&tokens);

        assert_eq!(trace[0].1, ScopeEvent::FunctionEntered);
        assert_eq!(
            trace[3].2,
            ScanPhase::Declaring {
                paren_depth: 1,
                params_closed: false
            }
        );
        assert_eq!(trace[6].1, ScopeEvent::BodyEntered);
        assert_eq!(trace[11].2, ScanPhase::InBody { depth: 2 });
        assert_eq!(trace.last().unwrap().1, ScopeEvent::FunctionExited);
        assert_eq!(trace.last().unwrap().2, ScanPhase::Outside);
        assert_eq!(
            trace.iter().filter(|(_, e, _)| e.resets_function()).count(),
            2
        );
    }

    #[test]
    fn test_nested_parameter_parentheses() {
        let tokens = tokenize_str("void f(void (*cb)(int)) { }").unwrap();
        let mut scope = FunctionScanState::new();
        let mut saw_body = false;
        for tok in tokens.refs() {
            if scope.advance(tok) == ScopeEvent::BodyEntered {
                saw_body = true;
                assert!(tok.is("{"));
            }
            if tok.is("cb") || tok.is("int") {
                assert!(scope.in_parameter_list());
            }
        }
        assert!(saw_body);
        assert!(!scope.in_function());
    }

    #[test]
    fn test_prototype_returns_outside() {
        let tokens = tokenize_str("int g(int **p); int x;").unwrap();
        let trace = events(&tokens);

        let semi = trace.iter().position(|(t, _, _)| t == ";").unwrap();
        assert_eq!(trace[semi].1, ScopeEvent::Abandoned);
        assert!(trace[semi..]
            .iter()
            .all(|(_, _, phase)| *phase == ScanPhase::Outside));
    }

    #[test]
    fn test_prototype_followed_by_definition() {
        let tokens = tokenize_str("int g(void) int h(void) { }").unwrap();
        let trace = events(&tokens);
        let h = trace.iter().position(|(t, _, _)| t == "h").unwrap();
        assert_eq!(trace[h - 1].1, ScopeEvent::FunctionEntered);
        assert_eq!(trace.last().unwrap().1, ScopeEvent::FunctionExited);
    }

    #[test]
    fn test_signature_inside_body_is_ignored() {
        let tokens = tokenize_str("void f() { int g(1); }").unwrap();
        let trace = events(&tokens);
        assert_eq!(
            trace
                .iter()
                .filter(|(_, e, _)| *e == ScopeEvent::FunctionEntered)
                .count(),
            1
        );
    }

    #[test]
    fn test_double_pointer_return_type_is_not_entered() {
        let tokens = tokenize_str("int **f(int **pp) { int x; *pp = &x; }").unwrap();
        assert!(events(&tokens)
            .iter()
            .all(|(_, _, phase)| *phase == ScanPhase::Outside));

        let tokens = tokenize_str("int *f(int **pp) { }").unwrap();
        assert_eq!(events(&tokens)[0].1, ScopeEvent::FunctionEntered);
    }

    #[test]
    fn test_unterminated_body_stays_open() {
        let tokens = tokenize_str("void f() { { int a;").unwrap();
        let mut scope = FunctionScanState::new();
        for tok in tokens.refs() {
            scope.advance(tok);
        }
        assert_eq!(scope.brace_depth(), 2);
    }
}
