//! # Validate Subcommand
//!
//! Checks commitizen configuration files against a schema and reports every
//! violation, as `path: message [Reason]` lines or as a JSON array.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use czconf_schema::{load_commitizen_config, CompileOptions, Schema, ValidationResult, Violation};

use crate::{default_schema_path, load_schema, resolve_path, EXIT_ERROR, EXIT_INVALID};

/// Arguments for the `czconf validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files (.cz.json, .cz.yaml, .cz.toml, pyproject.toml).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Schema to validate against. Defaults to schemas/cz-schema.json
    /// under the repository root.
    #[arg(long, env = "CZCONF_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file, followed by its violations.
    Human,
    /// A JSON array with one report per file.
    Json,
}

/// Outcome for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn exit_code(&self) -> u8 {
        match (&self.error, self.valid) {
            (Some(_), _) => EXIT_ERROR,
            (None, false) => EXIT_INVALID,
            (None, true) => 0,
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    let schema_path = match &args.schema {
        Some(path) => resolve_path(path, repo_root),
        None => default_schema_path(repo_root),
    };
    let schema = load_schema(&schema_path, CompileOptions::default())?;

    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|file| check_file(&schema, &resolve_path(file, repo_root)))
        .collect();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    Ok(reports.iter().map(FileReport::exit_code).max().unwrap_or(0))
}

/// Load one configuration file and validate it.
pub fn check_file(schema: &Schema, path: &Path) -> FileReport {
    let file = path.display().to_string();
    let instance = match load_commitizen_config(path) {
        Ok(instance) => instance,
        Err(e) => {
            tracing::debug!(file = %file, error = %e, "cannot load configuration");
            return FileReport {
                file,
                valid: false,
                violations: Vec::new(),
                error: Some(e.to_string()),
            };
        }
    };

    match schema.validate(&instance) {
        ValidationResult::Valid => FileReport {
            file,
            valid: true,
            violations: Vec::new(),
            error: None,
        },
        ValidationResult::Invalid(violations) => FileReport {
            file,
            valid: false,
            violations,
            error: None,
        },
    }
}

fn print_human(report: &FileReport) {
    if let Some(error) = &report.error {
        println!("ERROR: {error}");
    } else if report.valid {
        println!("OK: {}", report.file);
    } else {
        println!("FAIL: {} ({} violations)", report.file, report.violations.len());
        for violation in &report.violations {
            println!("{violation}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use czconf_schema::Reason;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop(); // crates/
        dir.pop(); // repo root
        dir
    }

    fn bundled_schema() -> Schema {
        load_schema(&default_schema_path(&repo_root()), CompileOptions::default()).unwrap()
    }

    fn args(files: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            files,
            schema: None,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn valid_pyproject_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        std::fs::write(
            &path,
            "[tool.commitizen]\nname = \"cz_conventional_commits\"\nversion = \"2.3.4\"\n",
        )
        .unwrap();

        let report = check_file(&bundled_schema(), &path);
        assert!(report.valid);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(run_validate(&args(vec![path]), &repo_root()).unwrap(), 0);
    }

    #[test]
    fn invalid_config_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".cz.json");
        std::fs::write(&path, r#"{"commitizen": {"gpg_sign": 1}}"#).unwrap();

        let report = check_file(&bundled_schema(), &path);
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].reason, Reason::TypeMismatch);
        assert_eq!(run_validate(&args(vec![path]), &repo_root()).unwrap(), 1);
    }

    #[test]
    fn unreadable_config_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join(".cz.yaml");
        std::fs::write(&good, "commitizen:\n  name: cz_conventional_commits\n").unwrap();
        let missing = dir.path().join("absent.toml");

        let report = check_file(&bundled_schema(), &missing);
        assert!(report.error.is_some());
        assert_eq!(run_validate(&args(vec![good, missing]), &repo_root()).unwrap(), 2);
    }

    #[test]
    fn missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(".cz.json");
        std::fs::write(&config, r#"{"commitizen": {}}"#).unwrap();
        let args = ValidateArgs {
            files: vec![config],
            schema: Some(dir.path().join("nope.schema.json")),
            format: OutputFormat::Human,
        };
        assert!(run_validate(&args, &repo_root()).is_err());
    }

    #[test]
    fn json_report_shape() {
        let report = FileReport {
            file: ".cz.json".to_string(),
            valid: true,
            violations: Vec::new(),
            error: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"file": ".cz.json", "valid": true}));
    }
}
