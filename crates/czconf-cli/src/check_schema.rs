//! # Check-Schema Subcommand
//!
//! Compiles a schema document and reports whether it is a well-formed
//! Draft 7 schema.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use czconf_schema::{compile_with, load_document, CompileOptions};

use crate::{default_schema_path, resolve_path, EXIT_INVALID};

/// Arguments for the `czconf check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema document. Defaults to schemas/cz-schema.json under the
    /// repository root.
    pub path: Option<PathBuf>,

    /// Also reject keywords outside the Draft 7 vocabulary.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the check-schema subcommand.
pub fn run_check_schema(args: &CheckSchemaArgs, repo_root: &Path) -> Result<u8> {
    let path = match &args.path {
        Some(path) => resolve_path(path, repo_root),
        None => default_schema_path(repo_root),
    };
    let document = load_document(&path)?;
    let options = CompileOptions::new().deny_unknown_keywords(args.strict);

    match compile_with(&document, options) {
        Ok(schema) => {
            println!(
                "OK: {} ({} nodes, {} definitions)",
                path.display(),
                schema.node_count(),
                schema.definition_names().count()
            );
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", path.display());
            Ok(EXIT_INVALID)
        }
    }
}
