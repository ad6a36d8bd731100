//! Per-function symbol roles
//!
//! Declarations are recognized as the scan passes over them. Parameters are
//! remembered by name, body locals by symbol id.

use fxhash::FxHashSet;
use log::trace;
use tokenizer::{Pattern, Slot, TokenRef};

/// `%type% * * %name%`
const POINTER_TO_POINTER_PARAMETER: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Lit("*"),
    Slot::Lit("*"),
    Slot::Name,
]);

/// `%type% * %name% [`
const POINTER_ARRAY_PARAMETER: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Lit("*"),
    Slot::Name,
    Slot::Lit("["),
]);

/// `%type% :: %var%`
const LOCAL_REFERENCE: Pattern = Pattern::new(&[Slot::Type, Slot::Lit("::"), Slot::Var]);

/// `%type% %var% [`
const LOCAL_ARRAY: Pattern = Pattern::new(&[Slot::Type, Slot::Var, Slot::Lit("[")]);

/// `%type% *|&| *| %var% ;`
const LOCAL_SCALAR: Pattern = Pattern::new(&[
    Slot::Type,
    Slot::Opt(&["*", "&"]),
    Slot::Opt(&["*"]),
    Slot::Var,
    Slot::Lit(";"),
]);

/// `const %type% *|&| *| %var% ;`
const CONST_LOCAL_SCALAR: Pattern = Pattern::new(&[
    Slot::Lit("const"),
    Slot::Type,
    Slot::Opt(&["*", "&"]),
    Slot::Opt(&["*"]),
    Slot::Var,
    Slot::Lit(";"),
]);

/// Tokens inspected before a declaration for a storage class
const STORAGE_LOOKBACK: isize = 3;

/// What a body token turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalDeclaration {
    Scalar(u32),
    Array(u32),
    /// A declaration shape whose storage outlives the call
    NotAuto,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolClassification {
    output_parameters: FxHashSet<String>,
    auto_scalars: FxHashSet<u32>,
    auto_arrays: FxHashSet<u32>,
}

impl SymbolClassification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.output_parameters.clear();
        self.auto_scalars.clear();
        self.auto_arrays.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.output_parameters.is_empty()
            && self.auto_scalars.is_empty()
            && self.auto_arrays.is_empty()
    }

    pub fn is_output_parameter(&self, name: &str) -> bool {
        self.output_parameters.contains(name)
    }

    pub fn is_auto_scalar(&self, var_id: u32) -> bool {
        self.auto_scalars.contains(&var_id)
    }

    pub fn is_auto_array(&self, var_id: u32) -> bool {
        self.auto_arrays.contains(&var_id)
    }

    pub fn output_parameter_count(&self) -> usize {
        self.output_parameters.len()
    }

    pub fn auto_scalar_count(&self) -> usize {
        self.auto_scalars.len()
    }

    pub fn auto_array_count(&self) -> usize {
        self.auto_arrays.len()
    }

    pub fn add_output_parameter(&mut self, name: &str) {
        self.output_parameters.insert(name.to_string());
    }

    /// Ignored for id 0 and for ids already classified as arrays
    pub fn add_auto_scalar(&mut self, var_id: u32) {
        if var_id != 0 && !self.auto_arrays.contains(&var_id) {
            self.auto_scalars.insert(var_id);
        }
    }

    /// Ignored for id 0 and for ids already classified as scalars
    pub fn add_auto_array(&mut self, var_id: u32) {
        if var_id != 0 && !self.auto_scalars.contains(&var_id) {
            self.auto_arrays.insert(var_id);
        }
    }

    /// Record an output parameter declared at `tok`. Returns whether one was found.
    pub fn classify_parameter(&mut self, tok: TokenRef<'_>) -> bool {
        let name = if tok.matches(&POINTER_TO_POINTER_PARAMETER) {
            tok.tok_at(3)
        } else if tok.matches(&POINTER_ARRAY_PARAMETER) {
            tok.tok_at(2)
        } else {
            None
        };

        match name {
            Some(name) => {
                trace!("output parameter `{}` at line {}", name.str(), name.line());
                self.add_output_parameter(name.str());
                true
            }
            None => false,
        }
    }

    /// Record a body-local declaration starting at `tok`.
    ///
    /// Returns `None` when `tok` does not start a declaration, in which case
    /// the position is free for escape detection.
    pub fn classify_local(&mut self, tok: TokenRef<'_>) -> Option<LocalDeclaration> {
        let declaration = recognize_local(tok)?;
        match declaration {
            LocalDeclaration::Scalar(id) => self.add_auto_scalar(id),
            LocalDeclaration::Array(id) => self.add_auto_array(id),
            LocalDeclaration::NotAuto => {}
        }
        trace!("{:?} declared at line {}", declaration, tok.line());
        Some(declaration)
    }
}

fn recognize_local(tok: TokenRef<'_>) -> Option<LocalDeclaration> {
    if let Some(m) = tok.match_pattern(&LOCAL_REFERENCE) {
        if has_storage_class(tok) {
            return Some(LocalDeclaration::NotAuto);
        }
        return m.token(2).map(|v| LocalDeclaration::Scalar(v.var_id()));
    }

    if let Some(m) = tok.match_pattern(&LOCAL_ARRAY) {
        return m.token(1).map(|v| LocalDeclaration::Array(v.var_id()));
    }

    // `%type%` never matches `case`, `return` or `delete`, so `return x ;` is not a declaration
    let (m, var_slot) = if let Some(m) = tok.match_pattern(&LOCAL_SCALAR) {
        (m, 3)
    } else if let Some(m) = tok.match_pattern(&CONST_LOCAL_SCALAR) {
        (m, 4)
    } else {
        return None;
    };

    if has_storage_class(tok) {
        return Some(LocalDeclaration::NotAuto);
    }
    m.token(var_slot).map(|var| LocalDeclaration::Scalar(var.var_id()))
}

/// `extern` or `static` among the few tokens before `tok`
fn has_storage_class(tok: TokenRef<'_>) -> bool {
    (1..=STORAGE_LOOKBACK)
        .filter_map(|back| tok.tok_at(-back))
        .any(|t| t.is("extern") || t.is("static"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenizer::{tokenize_str, TokenList};

    fn classify_body(tokens: &TokenList) -> SymbolClassification {
        let mut symbols = SymbolClassification::new();
        for tok in tokens.refs() {
            symbols.classify_local(tok);
        }
        symbols
    }

    fn id_of(tokens: &TokenList, name: &str) -> u32 {
        tokens
            .iter()
            .find(|t| t.text == name)
            .map(|t| t.var_id)
            .unwrap()
    }

    #[test]
    fn test_output_parameters() {
        let tokens = tokenize_str("void f(int **out, char *names[], int *plain, int n)").unwrap();
        let mut symbols = SymbolClassification::new();
        for tok in tokens.refs() {
            symbols.classify_parameter(tok);
        }
        assert!(symbols.is_output_parameter("out"));
        assert!(symbols.is_output_parameter("names"));
        assert!(!symbols.is_output_parameter("plain"));
        assert!(!symbols.is_output_parameter("n"));
        assert_eq!(symbols.output_parameter_count(), 2);
    }

    #[test]
    fn test_scalars_and_arrays() {
        let tokens = tokenize_str("{ int a; char *p; int &r; const long c; int buf[8]; }").unwrap();
        let symbols = classify_body(&tokens);

        for name in ["a", "p", "r", "c"] {
            assert!(symbols.is_auto_scalar(id_of(&tokens, name)), "{}", name);
        }
        assert!(symbols.is_auto_array(id_of(&tokens, "buf")));
        assert!(!symbols.is_auto_scalar(id_of(&tokens, "buf")));
        assert_eq!(symbols.auto_scalar_count(), 4);
        assert_eq!(symbols.auto_array_count(), 1);
    }

    #[test]
    fn test_storage_class_excluded() {
        let tokens = tokenize_str("{ extern int x; static int y; static const int z; }").unwrap();
        let symbols = classify_body(&tokens);
        assert_eq!(symbols.auto_scalar_count(), 0);
    }

    #[test]
    fn test_storage_class_is_reported_as_not_auto() {
        let tokens = tokenize_str("{ extern int x; }").unwrap();
        let int = tokens.refs().find(|t| t.is("int")).unwrap();
        let mut symbols = SymbolClassification::new();
        assert_eq!(symbols.classify_local(int), Some(LocalDeclaration::NotAuto));
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_scope_qualified_reference() {
        let tokens = tokenize_str("int r; void f() { T::r; }").unwrap();
        let t = tokens.refs().find(|t| t.is("T")).unwrap();
        let mut symbols = SymbolClassification::new();
        let r = id_of(&tokens, "r");
        assert_eq!(symbols.classify_local(t), Some(LocalDeclaration::Scalar(r)));
        assert!(symbols.is_auto_scalar(r));

        let tokens = tokenize_str("int r; void f() { static T::r; }").unwrap();
        let t = tokens.refs().find(|t| t.is("T")).unwrap();
        let mut symbols = SymbolClassification::new();
        assert_eq!(symbols.classify_local(t), Some(LocalDeclaration::NotAuto));
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_statement_keywords_do_not_declare() {
        let tokens = tokenize_str("int f(int x) { return x; }").unwrap();
        let ret = tokens.refs().find(|t| t.is("return")).unwrap();
        let mut symbols = SymbolClassification::new();
        assert_eq!(symbols.classify_local(ret), None);
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_first_classification_stands() {
        let mut symbols = SymbolClassification::new();
        symbols.add_auto_array(7);
        symbols.add_auto_scalar(7);
        symbols.add_auto_scalar(0);
        assert!(symbols.is_auto_array(7));
        assert!(!symbols.is_auto_scalar(7));
        assert!(!symbols.is_auto_scalar(0));
    }

    #[test]
    fn test_clear() {
        let mut symbols = SymbolClassification::new();
        symbols.add_output_parameter("pp");
        symbols.add_auto_scalar(1);
        symbols.add_auto_array(2);
        symbols.clear();
        assert!(symbols.is_empty());
    }
}
