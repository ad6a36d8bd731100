//! Auto-variable escape checks
//!
//! Two independent passes over a [`tokenizer::TokenList`]:
//!
//! - [`detect_auto_variable_escapes`]: the address of a local stored into an
//!   output parameter, `return &local;` and `free(local_array);`
//! - [`detect_local_array_pointer_returns`]: a pointer-returning function
//!   returning one of its own arrays
//!
//! Both report through a [`diagnostics::DiagnosticSink`]. The
//! [`CheckRegistry`] bundles them as the `AutoVariables` check.
//!
//! ```rust,ignore
//! use checks::CheckRegistry;
//! use diagnostics::Diagnostics;
//!
//! let tokens = tokenizer::tokenize_str("void f() { int a[4]; free(a); }")?;
//! let mut findings = Diagnostics::new();
//! CheckRegistry::with_builtin_checks().run_all(&tokens, &mut findings);
//! assert_eq!(findings.len(), 1);
//! ```

pub mod auto_variables;
pub mod classifier;
pub mod config;
pub mod local_array;
pub mod logging;
pub mod registry;
pub mod rules;
pub mod scope;

pub use auto_variables::detect_auto_variable_escapes;
pub use classifier::{LocalDeclaration, SymbolClassification};
pub use config::{find_config, AnalyzerConfig, ConfigError, OutputFormat, CONFIG_FILE_NAME};
pub use local_array::detect_local_array_pointer_returns;
pub use registry::{AutoVariables, Check, CheckRegistry};
pub use rules::{Rule, ALL_RULES, AUTO_VARIABLES, RETURN_LOCAL_VARIABLE};
pub use scope::{FunctionScanState, ScanPhase, ScopeEvent};
