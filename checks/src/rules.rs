//! Rule table for the auto-variable checks
//!
//! Every finding a check can emit is described by one static [`Rule`]. The
//! rule id becomes the diagnostic code and the message text is fixed, so it
//! can be matched verbatim by tooling and tests.
//!
//! | Rule | Id | Message |
//! |------|----|---------|
//! | [`ASSIGN_TO_OUTPUT_PARAMETER`] | `autoVariables` | Wrong assignment of an auto-variable to an effective parameter of a function |
//! | [`RETURN_ADDRESS_OF_AUTO`] | `autoVariables` | Return of the address of an auto-variable |
//! | [`INVALID_DEALLOCATION`] | `autoVariables` | Invalid deallocation |
//! | [`RETURN_LOCAL_ARRAY`] | `returnLocalVariable` | Returning pointer to local array variable |

use diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticSeverity};
use std::fmt;
use tokenizer::TokenRef;

pub const AUTO_VARIABLES: &str = "autoVariables";
pub const RETURN_LOCAL_VARIABLE: &str = "returnLocalVariable";

/// One kind of finding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Rule id, used as the diagnostic code
    pub id: &'static str,
    pub severity: DiagnosticSeverity,
    /// Fixed human-readable message
    pub message: &'static str,
    /// Short description for `stacklint rules`
    pub summary: &'static str,
}

impl Rule {
    pub const fn new(
        id: &'static str,
        severity: DiagnosticSeverity,
        message: &'static str,
        summary: &'static str,
    ) -> Self {
        Self {
            id,
            severity,
            message,
            summary,
        }
    }

    /// Build the finding for this rule located at `at`
    pub fn diagnostic(&self, at: TokenRef<'_>, label: impl Into<String>) -> Diagnostic {
        DiagnosticBuilder::new(self.severity, self.message, at.span())
            .code(self.id)
            .label(at.span(), label)
            .build()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.id, self.severity, self.message)
    }
}

pub const ASSIGN_TO_OUTPUT_PARAMETER: Rule = Rule::new(
    AUTO_VARIABLES,
    DiagnosticSeverity::Error,
    "Wrong assignment of an auto-variable to an effective parameter of a function",
    "address of a local stored into a pointer-to-pointer or array parameter",
);

pub const RETURN_ADDRESS_OF_AUTO: Rule = Rule::new(
    AUTO_VARIABLES,
    DiagnosticSeverity::Error,
    "Return of the address of an auto-variable",
    "`return &local;` hands out a pointer to dead storage",
);

pub const INVALID_DEALLOCATION: Rule = Rule::new(
    AUTO_VARIABLES,
    DiagnosticSeverity::Error,
    "Invalid deallocation",
    "local array passed to free()",
);

pub const RETURN_LOCAL_ARRAY: Rule = Rule::new(
    RETURN_LOCAL_VARIABLE,
    DiagnosticSeverity::Error,
    "Returning pointer to local array variable",
    "pointer-returning function returns one of its local arrays",
);

/// Every rule, in reporting order
pub static ALL_RULES: [&Rule; 4] = [
    &ASSIGN_TO_OUTPUT_PARAMETER,
    &RETURN_ADDRESS_OF_AUTO,
    &INVALID_DEALLOCATION,
    &RETURN_LOCAL_ARRAY,
];

/// Rules sharing `id`
pub fn rules_with_id(id: &str) -> impl Iterator<Item = &'static Rule> + '_ {
    ALL_RULES.iter().copied().filter(move |rule| rule.id == id)
}
