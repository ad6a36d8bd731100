//! `stacklint.toml` parsing.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::registry::CheckRegistry;

/// File name looked up by [`find_config`]
pub const CONFIG_FILE_NAME: &str = "stacklint.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
    UnknownCheck(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
            ConfigError::Parse(message) => {
                write!(f, "Failed to parse {}: {}", CONFIG_FILE_NAME, message)
            }
            ConfigError::UnknownCheck(name) => write!(f, "Unknown check '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub checks: ChecksConfig,
    pub output: OutputConfig,
}

/// `[checks]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Checks to run; every registered check when absent
    pub enabled: Option<Vec<String>>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// ANSI colors in text output
    pub colors: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl AnalyzerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Names of the checks to run, validated against `registry`
    pub fn enabled_checks(&self, registry: &CheckRegistry) -> Result<Vec<String>, ConfigError> {
        match &self.checks.enabled {
            Some(names) => {
                registry.validate(names)?;
                Ok(names.clone())
            }
            None => Ok(registry.names().map(str::to_string).collect()),
        }
    }
}

/// Nearest `stacklint.toml` in `start` or one of its ancestors
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.colors);
    }

    #[test]
    fn test_full_config() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
[checks]
enabled = ["AutoVariables"]

[output]
format = "json"
colors = true
"#,
        )
        .unwrap();
        assert_eq!(config.checks.enabled, Some(vec!["AutoVariables".to_string()]));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.colors);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            AnalyzerConfig::from_toml_str("[output]\nformat = \"xml\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AnalyzerConfig::from_toml_str("[checks]\nenable = []\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_enabled_checks() {
        let registry = CheckRegistry::with_builtin_checks();

        let all = AnalyzerConfig::default().enabled_checks(&registry).unwrap();
        assert_eq!(all, vec!["AutoVariables".to_string()]);

        let config = AnalyzerConfig::from_toml_str("[checks]\nenabled = [\"Leaks\"]\n").unwrap();
        assert_eq!(
            config.enabled_checks(&registry),
            Err(ConfigError::UnknownCheck("Leaks".to_string()))
        );
    }

    #[test]
    fn test_missing_file() {
        let err = AnalyzerConfig::load(Path::new("/nonexistent/stacklint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read /nonexistent/stacklint.toml"));
    }
}
