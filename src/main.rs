//! stacklint - finds pointers to auto variables that outlive their function
//!
//! # Usage
//!
//! ```bash
//! # Analyze C sources
//! stacklint check src/*.c
//!
//! # Machine-readable output
//! stacklint check --format json lib.c
//!
//! # List checks and the rules they report
//! stacklint rules
//! ```
//!
//! Exit status is 0 when nothing was found, 2 when findings were reported and
//! 1 when the run itself failed.

use checks::{find_config, AnalyzerConfig, CheckRegistry};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use diagnostics::{Diagnostics, ErrorFormatter, FileId, SourceMap};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "stacklint")]
#[command(version = "0.1.0")]
#[command(about = "Detects auto variables escaping their function in C code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze source files
    Check {
        /// C source files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format (overrides the config file)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Config file (defaults to the nearest stacklint.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Comma-separated checks to run
        #[arg(long, value_delimiter = ',')]
        checks: Vec<String>,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,

        /// Increase log verbosity (-v info, -vv debug, -vvv trace)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },

    /// List checks and their rules
    Rules,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl From<checks::OutputFormat> for OutputFormat {
    fn from(format: checks::OutputFormat) -> Self {
        match format {
            checks::OutputFormat::Text => OutputFormat::Text,
            checks::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// One finding as printed by `--format json`
#[derive(Serialize)]
struct JsonFinding<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    severity: &'static str,
    id: &'a str,
    message: &'a str,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            files,
            format,
            config,
            checks: selected,
            no_color,
            verbose,
        } => {
            checks::logging::init_for_verbosity(verbose);
            check_files(files, format, config, selected, no_color)
        }
        Commands::Rules => {
            checks::logging::init();
            list_rules();
            Ok(0)
        }
    };

    match result {
        Ok(0) => {}
        Ok(_) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<AnalyzerConfig, String> {
    let path = match explicit {
        Some(path) => Some(path),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| find_config(&dir)),
    };

    match path {
        Some(path) => {
            info!("using config {}", path.display());
            AnalyzerConfig::load(&path).map_err(|e| e.to_string())
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

/// Analyze `files` and print the findings. Returns the number of errors.
fn check_files(
    files: Vec<PathBuf>,
    format: Option<OutputFormat>,
    config: Option<PathBuf>,
    selected: Vec<String>,
    no_color: bool,
) -> Result<usize, String> {
    let config = load_config(config)?;
    let registry = CheckRegistry::with_builtin_checks();

    let enabled = if selected.is_empty() {
        config.enabled_checks(&registry).map_err(|e| e.to_string())?
    } else {
        registry.validate(&selected).map_err(|e| e.to_string())?;
        selected
    };
    let format = format.unwrap_or_else(|| config.output.format.into());
    let colors = config.output.colors && !no_color;

    let mut source_map = SourceMap::new();
    for path in &files {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        source_map.add_file(path.display().to_string(), content);
    }

    let per_file = source_map
        .file_ids()
        .into_par_iter()
        .map(|file_id| analyze_file(&source_map, file_id, &registry, &enabled))
        .collect::<Result<Vec<_>, String>>()?;

    let mut findings = Diagnostics::new();
    for file_findings in per_file {
        findings.extend(file_findings);
    }
    info!(
        "{} finding(s) in {} file(s)",
        findings.len(),
        source_map.len()
    );

    match format {
        OutputFormat::Text => {
            if !findings.is_empty() {
                let formatter = if colors {
                    ErrorFormatter::with_colors()
                } else {
                    ErrorFormatter::new()
                };
                print!("{}", formatter.format_diagnostics(findings.iter(), &source_map));
            }
        }
        OutputFormat::Json => println!("{}", to_json(&findings, &source_map)?),
    }

    Ok(findings.errors().count())
}

fn analyze_file(
    source_map: &SourceMap,
    file_id: FileId,
    registry: &CheckRegistry,
    enabled: &[String],
) -> Result<Diagnostics, String> {
    let file = source_map
        .get_file(file_id)
        .ok_or_else(|| format!("Unknown file id {}", file_id))?;
    info!("checking {}", file.name);

    let mut findings = Diagnostics::new();
    match tokenizer::tokenize(&file.content, file_id) {
        Ok(tokens) => registry
            .run_selected(enabled, &tokens, &mut findings)
            .map_err(|e| e.to_string())?,
        Err(e) => {
            warn!("{}: {}, file skipped", file.name, e);
            findings.push(e.to_diagnostic(file_id));
        }
    }
    Ok(findings)
}

fn to_json(findings: &Diagnostics, source_map: &SourceMap) -> Result<String, String> {
    let records: Vec<JsonFinding<'_>> = findings
        .iter()
        .map(|d| JsonFinding {
            file: source_map.file_name(d.span.file_id).unwrap_or("<unknown>"),
            line: d.line(),
            column: d.column(),
            severity: d.severity.as_str(),
            id: d.rule_id().unwrap_or(""),
            message: &d.message,
        })
        .collect();
    serde_json::to_string_pretty(&records).map_err(|e| format!("Failed to encode findings: {}", e))
}

fn list_rules() {
    let registry = CheckRegistry::with_builtin_checks();
    for check in registry.iter() {
        println!("{}", check.name());
        for rule in check.rules() {
            println!(
                "  {:<20} {:<8} {}",
                rule.id,
                rule.severity.as_str(),
                rule.message
            );
            println!("  {:<20} {:<8} ({})", "", "", rule.summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnostics::{Diagnostic, DiagnosticSeverity};

    fn analyze(source: &str) -> (SourceMap, Diagnostics) {
        let mut source_map = SourceMap::new();
        let file_id = source_map.add_file("sample.c", source);
        let registry = CheckRegistry::with_builtin_checks();
        let enabled = vec!["AutoVariables".to_string()];
        let findings = analyze_file(&source_map, file_id, &registry, &enabled).unwrap();
        (source_map, findings)
    }

    #[test]
    fn test_json_output() {
        let (source_map, findings) = analyze("void f() {\n  int a[2];\n  free(a);\n}\n");
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&findings, &source_map).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "file": "sample.c",
                "line": 3,
                "column": 3,
                "severity": "error",
                "id": "autoVariables",
                "message": "Invalid deallocation",
            }])
        );
    }

    #[test]
    fn test_lex_error_is_reported_as_finding() {
        let (_, findings) = analyze("void f() { char *s = \"open; }");
        let all: Vec<&Diagnostic> = findings.iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rule_id(), Some(tokenizer::SYNTAX_ERROR));
        assert_eq!(all[0].severity, DiagnosticSeverity::Error);
    }

    #[test]
    fn test_text_output_names_rule() {
        let (source_map, findings) = analyze("int *f() {\n  int a[4];\n  return a;\n}\n");
        let text = ErrorFormatter::new().format_diagnostics(findings.iter(), &source_map);
        assert!(text.starts_with(
            "error[returnLocalVariable]: Returning pointer to local array variable"
        ));
        assert!(text.contains("sample.c:3:3"));
    }

    #[test]
    fn test_config_format_maps_to_cli_format() {
        assert_eq!(OutputFormat::from(checks::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(checks::OutputFormat::Text), OutputFormat::Text);
    }

    #[test]
    fn test_unknown_config_path_fails() {
        assert!(load_config(Some(PathBuf::from("/nonexistent/stacklint.toml"))).is_err());
    }
}
