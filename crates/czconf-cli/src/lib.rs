//! # czconf-cli: Command-Line Front End
//!
//! Provides the `czconf` binary:
//!
//! ```bash
//! czconf validate pyproject.toml .cz.yaml
//! czconf validate --format json .cz.json
//! czconf check-schema schemas/cz-schema.json
//! ```
//!
//! Exit codes: `0` when everything is valid, `1` when a document (or, for
//! `check-schema`, the schema) is invalid, `2` when a file cannot be loaded.

pub mod check_schema;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use czconf_schema::{compile_with, load_document, CompileOptions, Schema, COMMITIZEN_SCHEMA};

/// Exit code for a document or schema that loaded but is invalid.
pub const EXIT_INVALID: u8 = 1;

/// Exit code for files that could not be read, parsed or compiled.
pub const EXIT_ERROR: u8 = 2;

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path is taken relative to
/// `repo_root` if it exists there, and relative to the current directory
/// otherwise.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory holding
/// `schemas/cz-schema.json`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("schemas").join(COMMITIZEN_SCHEMA).is_file())
        .map(Path::to_path_buf)
}

/// The bundled schema under a repository root.
pub fn default_schema_path(repo_root: &Path) -> PathBuf {
    repo_root.join("schemas").join(COMMITIZEN_SCHEMA)
}

/// Load and compile a schema document.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or is not a well-formed
/// schema.
pub fn load_schema(path: &Path, options: CompileOptions) -> Result<Schema> {
    let document = load_document(path)?;
    let schema = compile_with(&document, options)
        .with_context(|| format!("invalid schema {}", path.display()))?;
    tracing::info!(schema = %path.display(), nodes = schema.node_count(), "loaded schema");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_absolute_path_returned_as_is() {
        let repo_root = Path::new("/some/repo");
        let result = resolve_path(Path::new("/absolute/.cz.toml"), repo_root);
        assert_eq!(result, PathBuf::from("/absolute/.cz.toml"));
    }

    #[test]
    fn resolve_path_relative_path_exists_in_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".cz.json"), b"{}").unwrap();
        let result = resolve_path(Path::new(".cz.json"), dir.path());
        assert_eq!(result, dir.path().join(".cz.json"));
    }

    #[test]
    fn resolve_path_relative_path_not_in_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_path(Path::new("missing.yaml"), dir.path());
        assert_eq!(result, PathBuf::from("missing.yaml"));
    }

    #[test]
    fn find_repo_root_walks_up_to_schemas() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
        std::fs::write(default_schema_path(dir.path()), b"{}").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_repo_root_none_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
        assert_eq!(find_repo_root(dir.path()), None);
    }

    #[test]
    fn load_schema_reports_compile_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.schema.json");
        std::fs::write(&path, r#"{"type": "strnig"}"#).unwrap();
        let err = load_schema(&path, CompileOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("strnig"));
    }
}
