//! # Violations and Validation Results
//!
//! A [`Violation`] names where the instance failed (an [`InstancePath`] of
//! property names and array indices from the document root), which schema
//! keyword failed, a [`Reason`] tag, and a human-readable message.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step of an [`InstancePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a value inside the instance document.
///
/// Displays as a JSON Pointer (`/commitizen/style/0/1`); the root is the
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path one step below this one.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for InstancePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for InstancePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Reason {
    /// The value's JSON type is not in the declared type set (also used
    /// for the `false` schema, which admits no type).
    TypeMismatch,
    /// A `required` property is absent.
    MissingRequired,
    /// A string does not match `pattern`.
    PatternMismatch,
    /// A value is outside `enum`, or differs from `const`.
    EnumMismatch,
    /// A numeric, length, item-count or property-count bound was crossed.
    OutOfBounds,
    /// `anyOf`/`oneOf`/`not` matched the wrong number of branches.
    WrongArity,
    /// A property not declared in `properties` under
    /// `additionalProperties: false`.
    UnknownAdditionalProperty,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::TypeMismatch => "TypeMismatch",
            Reason::MissingRequired => "MissingRequired",
            Reason::PatternMismatch => "PatternMismatch",
            Reason::EnumMismatch => "EnumMismatch",
            Reason::OutOfBounds => "OutOfBounds",
            Reason::WrongArity => "WrongArity",
            Reason::UnknownAdditionalProperty => "UnknownAdditionalProperty",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Path to the violating value in the instance.
    pub instance_path: InstancePath,
    /// JSON Pointer of the failing keyword in the schema.
    pub schema_path: String,
    pub reason: Reason,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_root() {
            write!(f, "  (root): {} [{}]", self.message, self.reason)
        } else {
            write!(f, "  {}: {} [{}]", self.instance_path, self.message, self.reason)
        }
    }
}

/// Outcome of validating one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    /// Every violation found, in evaluation order. Never empty.
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    /// `Valid` for an empty list, `Invalid` otherwise.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        match self {
            ValidationResult::Valid => Vec::new(),
            ValidationResult::Invalid(violations) => violations,
        }
    }

    /// Whether any violation carries `reason`.
    pub fn has_reason(&self, reason: Reason) -> bool {
        self.violations().iter().any(|v| v.reason == reason)
    }

    /// Whether any violation with `reason` sits at `path` (a JSON Pointer).
    pub fn has_violation_at(&self, path: &str, reason: Reason) -> bool {
        self.violations()
            .iter()
            .any(|v| v.reason == reason && v.instance_path.to_string() == path)
    }
}

/// Collection of validation violations, as carried by
/// [`SchemaValidationError::ValidationFailed`](crate::SchemaValidationError::ValidationFailed).
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(path: InstancePath, reason: Reason) -> Violation {
        Violation {
            instance_path: path,
            schema_path: "#/properties/commitizen/properties/gpg_sign/type".to_string(),
            reason,
            message: r#"1 is not of type "boolean""#.to_string(),
        }
    }

    #[test]
    fn instance_path_renders_as_json_pointer() {
        let path = InstancePath::root().child("commitizen").child("style").child(0usize);
        assert_eq!(path.to_string(), "/commitizen/style/0");
        assert_eq!(InstancePath::root().to_string(), "");
    }

    #[test]
    fn instance_path_escapes_pointer_syntax() {
        let path: InstancePath = ["a/b", "c~d"].into_iter().collect();
        assert_eq!(path.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn violation_display_format() {
        let v = violation(
            ["commitizen", "gpg_sign"].into_iter().collect(),
            Reason::TypeMismatch,
        );
        let display = v.to_string();
        assert!(display.contains("/commitizen/gpg_sign"));
        assert!(display.contains("not of type"));
        assert!(display.ends_with("[TypeMismatch]"));
    }

    #[test]
    fn violation_display_root() {
        let v = violation(InstancePath::root(), Reason::MissingRequired);
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn violation_serializes_path_as_pointer() {
        let v = violation(["commitizen", "gpg_sign"].into_iter().collect(), Reason::TypeMismatch);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["instance_path"], "/commitizen/gpg_sign");
        assert_eq!(json["reason"], "TypeMismatch");
    }

    #[test]
    fn result_from_empty_list_is_valid() {
        assert!(ValidationResult::from_violations(Vec::new()).is_valid());
        let invalid = ValidationResult::from_violations(vec![violation(
            InstancePath::root(),
            Reason::EnumMismatch,
        )]);
        assert!(!invalid.is_valid());
        assert!(invalid.has_reason(Reason::EnumMismatch));
        assert!(invalid.has_violation_at("", Reason::EnumMismatch));
        assert_eq!(invalid.into_violations().len(), 1);
    }

    #[test]
    fn violations_display_one_per_line() {
        let list = ValidationViolations::new(vec![
            violation(InstancePath::root(), Reason::MissingRequired),
            violation(InstancePath::root().child("x"), Reason::TypeMismatch),
        ]);
        assert_eq!(list.to_string().lines().count(), 2);
        assert_eq!(list.len(), 2);
    }
}
