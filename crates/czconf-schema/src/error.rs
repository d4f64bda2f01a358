//! # Error Types
//!
//! Two error families:
//!
//! - [`SchemaError`]: the schema document itself is malformed. Raised by
//!   [`compile`](crate::compile()) and never retried.
//! - [`SchemaValidationError`]: raised by the [`SchemaValidator`](crate::SchemaValidator)
//!   facade and the document loader: missing files, unparsable documents,
//!   unknown schema names, and documents that failed validation.
//!
//! A failed validation is *not* an error at the engine level: the engine
//! returns [`ValidationResult::Invalid`](crate::ValidationResult::Invalid).
//! Only the facade turns it into [`SchemaValidationError::ValidationFailed`].

use thiserror::Error;

use crate::violation::ValidationViolations;

/// The schema document is not a well-formed Draft 7 schema.
///
/// Every variant carries the JSON Pointer location (rooted at `#`) of the
/// offending keyword or subschema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A subschema is neither an object nor a boolean.
    #[error("{location}: a schema must be an object or a boolean, found {found}")]
    InvalidSchemaType {
        /// Location of the subschema.
        location: String,
        /// JSON type name of what was found instead.
        found: &'static str,
    },

    /// `type` names something outside the seven JSON types.
    #[error("{location}: unknown type name \"{name}\"")]
    UnknownType {
        /// Location of the `type` keyword.
        location: String,
        /// The unrecognized token.
        name: String,
    },

    /// A keyword carries a value of the wrong shape.
    #[error("{location}: invalid value for \"{keyword}\": {reason}")]
    InvalidKeyword {
        /// Location of the keyword.
        location: String,
        /// Keyword name.
        keyword: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// `pattern` is not a valid regular expression.
    #[error("{location}: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Location of the `pattern` keyword.
        location: String,
        /// The pattern source text.
        pattern: String,
        /// Regex compiler diagnostic.
        reason: String,
    },

    /// A lower bound exceeds its matching upper bound.
    #[error("{location}: \"{lower}\" ({lower_value}) exceeds \"{upper}\" ({upper_value})")]
    ContradictoryBounds {
        /// Location of the subschema.
        location: String,
        /// Lower-bound keyword.
        lower: &'static str,
        /// Lower-bound value.
        lower_value: f64,
        /// Upper-bound keyword.
        upper: &'static str,
        /// Upper-bound value.
        upper_value: f64,
    },

    /// `$ref` points somewhere other than `#` or `#/definitions/<name>`.
    #[error("{location}: unsupported reference \"{reference}\" (only local #/definitions references are resolved)")]
    UnsupportedReference {
        /// Location of the `$ref` keyword.
        location: String,
        /// The reference text.
        reference: String,
    },

    /// `$ref` names a definition that does not exist.
    #[error("{location}: unresolved reference \"{reference}\"")]
    UnresolvedReference {
        /// Location of the `$ref` keyword.
        location: String,
        /// The reference text.
        reference: String,
    },

    /// References loop back on themselves without consuming any instance
    /// structure, so validation would never terminate.
    #[error("reference cycle: {chain}")]
    ReferenceCycle {
        /// The cycle rendered as `a -> b -> a`.
        chain: String,
    },

    /// `$schema` declares a draft other than Draft 7.
    #[error("unsupported $schema \"{uri}\": only Draft 7 is supported")]
    UnsupportedDraft {
        /// The declared meta-schema URI.
        uri: String,
    },

    /// A Draft 7 assertion keyword this engine does not evaluate. Rejected
    /// rather than ignored so no constraint is silently dropped.
    #[error("{location}: keyword \"{keyword}\" is not supported")]
    UnsupportedKeyword {
        /// Location of the subschema.
        location: String,
        /// Keyword name.
        keyword: String,
    },

    /// Unknown keyword under `CompileOptions::deny_unknown_keywords`.
    #[error("{location}: unknown keyword \"{keyword}\"")]
    UnknownKeyword {
        /// Location of the subschema.
        location: String,
        /// Keyword name.
        keyword: String,
    },
}

/// Errors returned by the [`SchemaValidator`](crate::SchemaValidator) facade
/// and the document loader.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema file could not be read or parsed as JSON.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or directory.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema parsed as JSON but is not a well-formed schema.
    #[error("schema compile error for '{schema_name}': {source}")]
    SchemaCompileError {
        /// Schema filename.
        schema_name: String,
        /// The compiler diagnostic.
        #[source]
        source: SchemaError,
    },

    /// The requested schema is not registered.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error reading a schema or document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_display_names_location() {
        let err = SchemaError::UnknownType {
            location: "#/properties/gpg_sign/type".to_string(),
            name: "bool".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#/properties/gpg_sign/type"));
        assert!(msg.contains("\"bool\""));
    }

    #[test]
    fn compile_error_keeps_source() {
        let err = SchemaValidationError::SchemaCompileError {
            schema_name: "cz-schema.json".to_string(),
            source: SchemaError::UnsupportedDraft {
                uri: "https://json-schema.org/draft/2020-12/schema".to_string(),
            },
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("cz-schema.json"));
    }
}
