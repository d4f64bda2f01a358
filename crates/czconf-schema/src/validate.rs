//! # Schema Registry
//!
//! [`SchemaValidator`] loads every schema document in a directory once,
//! compiles it, and validates documents against schemas by file name.
//!
//! A schema file is any file whose name ends in `schema.json`
//! (`cz-schema.json`, `module.schema.json`). Other JSON files in the
//! directory, such as example configurations, are skipped.
//!
//! Compilation failures are fatal at construction: a registry never holds a
//! half-usable schema.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::compile::compile;
use crate::error::SchemaValidationError;
use crate::loader::{load_commitizen_config, load_document};
use crate::node::Schema;
use crate::violation::{ValidationResult, ValidationViolations};

/// File name of the bundled commitizen configuration schema.
pub const COMMITIZEN_SCHEMA: &str = "cz-schema.json";

/// A registry of compiled schemas loaded from a directory.
///
/// ## Thread Safety
///
/// `SchemaValidator` is `Send + Sync` and read-only after construction.
#[derive(Debug)]
pub struct SchemaValidator {
    schema_dir: PathBuf,
    /// Schema file name -> compiled schema.
    schemas: HashMap<String, Schema>,
}

impl SchemaValidator {
    /// Load and compile every `*schema.json` file in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaLoadError`] if the directory
    /// or a schema file cannot be read or parsed as JSON, and
    /// [`SchemaValidationError::SchemaCompileError`] if a schema is not a
    /// well-formed Draft 7 schema.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with("schema.json") || !path.is_file() {
                continue;
            }
            let schema = load_schema(&path, name)?;
            tracing::debug!(schema = name, nodes = schema.node_count(), "registered schema");
            schemas.insert(name.to_string(), schema);
        }

        tracing::debug!(
            dir = %schema_dir.display(),
            count = schemas.len(),
            "schema registry loaded"
        );
        Ok(Self { schema_dir, schemas })
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a compiled schema by file name.
    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaNotFound`] for an unknown
    /// schema name and [`SchemaValidationError::ValidationFailed`] with every
    /// violation if the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let schema = self
            .get_schema(schema_name)
            .ok_or_else(|| SchemaValidationError::SchemaNotFound(schema_name.to_string()))?;

        match schema.validate(instance) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(violations) => {
                tracing::debug!(
                    schema = schema_name,
                    violations = violations.len(),
                    "document failed validation"
                );
                Err(SchemaValidationError::ValidationFailed {
                    schema_name: schema_name.to_string(),
                    violations: ValidationViolations::new(violations),
                })
            }
        }
    }

    /// Load a JSON, YAML or TOML document from disk and validate it against
    /// a named schema.
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let instance = load_document(document_path)?;
        self.validate_document(&instance, schema_name)
    }

    /// Validate a commitizen configuration file (`pyproject.toml`,
    /// `.cz.toml`, `.cz.json`, `.cz.yaml`, ...) against the bundled
    /// [`COMMITIZEN_SCHEMA`].
    ///
    /// Violation reports name the file alongside the schema.
    pub fn validate_commitizen_config(&self, path: &Path) -> Result<(), SchemaValidationError> {
        let instance = load_commitizen_config(path)?;
        self.validate_document(&instance, COMMITIZEN_SCHEMA)
            .map_err(|e| match e {
                SchemaValidationError::ValidationFailed { violations, .. } => {
                    SchemaValidationError::ValidationFailed {
                        schema_name: format!("{COMMITIZEN_SCHEMA} ({})", path.display()),
                        violations,
                    }
                }
                other => other,
            })
    }
}

fn load_schema(path: &Path, name: &str) -> Result<Schema, SchemaValidationError> {
    let content = std::fs::read_to_string(path)?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: name.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
    compile(&document).map_err(|source| SchemaValidationError::SchemaCompileError {
        schema_name: name.to_string(),
        source,
    })
}
