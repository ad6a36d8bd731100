//! Explicit check registry
//!
//! Checks are constructed and registered by [`CheckRegistry::with_builtin_checks`]
//! at startup; nothing registers itself.

use diagnostics::DiagnosticSink;
use indexmap::IndexMap;
use log::debug;
use tokenizer::TokenList;

use crate::auto_variables::detect_auto_variable_escapes;
use crate::config::ConfigError;
use crate::local_array::detect_local_array_pointer_returns;
use crate::rules::{Rule, ALL_RULES};

/// A named group of rules run over one token list
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rules this check can report
    fn rules(&self) -> &'static [&'static Rule];

    fn run(&self, tokens: &TokenList, sink: &mut dyn DiagnosticSink);
}

/// Escape analysis of auto variables: output parameters, returned
/// addresses, freed arrays and returned local arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoVariables;

impl Check for AutoVariables {
    fn name(&self) -> &'static str {
        "AutoVariables"
    }

    fn rules(&self) -> &'static [&'static Rule] {
        &ALL_RULES
    }

    fn run(&self, tokens: &TokenList, sink: &mut dyn DiagnosticSink) {
        detect_auto_variable_escapes(tokens, sink);
        detect_local_array_pointer_returns(tokens, sink);
    }
}

/// Checks by name, in registration order
#[derive(Default)]
pub struct CheckRegistry {
    checks: IndexMap<&'static str, Box<dyn Check>>,
}

impl CheckRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every check shipped with stacklint
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AutoVariables));
        registry
    }

    /// Add a check, replacing and returning any check of the same name
    pub fn register(&mut self, check: Box<dyn Check>) -> Option<Box<dyn Check>> {
        debug!("registering check {}", check.name());
        self.checks.insert(check.name(), check)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Check> {
        self.checks.get(name).map(|check| check.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.values().map(|check| check.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Fail on the first name that is not registered
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ConfigError> {
        match names.iter().find(|name| !self.contains(name.as_ref())) {
            Some(unknown) => Err(ConfigError::UnknownCheck(unknown.as_ref().to_string())),
            None => Ok(()),
        }
    }

    pub fn run_all(&self, tokens: &TokenList, sink: &mut dyn DiagnosticSink) {
        for check in self.checks.values() {
            check.run(tokens, sink);
        }
    }

    /// Run the named checks in registration order
    pub fn run_selected<S: AsRef<str>>(
        &self,
        names: &[S],
        tokens: &TokenList,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), ConfigError> {
        self.validate(names)?;
        for (name, check) in &self.checks {
            if names.iter().any(|n| n.as_ref() == *name) {
                check.run(tokens, sink);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.checks.keys()).finish()
    }
}
