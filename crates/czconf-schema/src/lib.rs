//! # czconf-schema: Configuration Schema Validation
//!
//! A Draft 7 JSON Schema engine sized for configuration files, plus the
//! loading and registry plumbing used to check commitizen settings against
//! the bundled `schemas/cz-schema.json`.
//!
//! ## Engine (`compile`, `evaluate`)
//!
//! - [`compile()`] turns a schema document into an immutable [`Schema`],
//!   rejecting malformed schemas with a [`SchemaError`] that names the
//!   offending location. [`check_schema`] is the same check without
//!   keeping the result.
//! - [`validate()`] walks an instance against a compiled schema and
//!   collects every [`Violation`], each tagged with a [`Reason`] and the
//!   [`InstancePath`] of the failing value.
//!
//! ## Documents (`loader`)
//!
//! JSON, YAML and TOML files are read into `serde_json::Value`.
//! [`load_commitizen_config`] pulls the settings block out of
//! `pyproject.toml`, `.cz.toml`, `.cz.json` or `.cz.yaml`.
//!
//! ## Registry (`validate`)
//!
//! [`SchemaValidator`] compiles every schema in a directory once and
//! validates documents by schema file name.
//!
//! ## Crate Policy
//!
//! - No network access: only local `#` and `#/definitions/...` references.
//! - A failed validation is a [`ValidationResult`], not an error. The
//!   registry facade is where it becomes
//!   [`SchemaValidationError::ValidationFailed`].

pub mod compile;
pub mod error;
pub mod evaluate;
pub mod loader;
pub mod node;
pub mod pattern;
pub mod validate;
pub mod value;
pub mod violation;

pub use compile::{check_schema, compile, compile_with, CompileOptions};
pub use error::{SchemaError, SchemaValidationError};
pub use evaluate::validate;
pub use loader::{load_commitizen_config, load_document, DocumentFormat};
pub use node::{JsonType, Schema, SchemaNode, TypeSet};
pub use validate::{SchemaValidator, COMMITIZEN_SCHEMA};
pub use violation::{InstancePath, Reason, ValidationResult, ValidationViolations, Violation};
