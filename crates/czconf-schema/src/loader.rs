//! # Document Loading
//!
//! Reads configuration and schema documents from disk and converts them to
//! `serde_json::Value`. The format is chosen from the file extension:
//! `.yaml`/`.yml` for YAML, `.toml` for TOML, anything else is parsed as
//! JSON.
//!
//! [`load_commitizen_config`] additionally normalizes the places a
//! commitizen settings block can live (`[tool.commitizen]` in
//! `pyproject.toml` or `.cz.toml`, a top-level `commitizen` key in
//! `.cz.json`/`.cz.yaml`) into the `{"commitizen": {...}}` shape the
//! bundled schema expects.

use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::SchemaValidationError;

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Parse document text in the given format.
///
/// # Errors
///
/// Returns a human-readable reason when the text does not parse or holds
/// values JSON cannot represent.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, String> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}")),
        DocumentFormat::Yaml => {
            let yaml_value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml_to_json_value(&yaml_value).map_err(|e| format!("YAML-to-JSON conversion failed: {e}"))
        }
        DocumentFormat::Toml => {
            let toml_value: toml::Value =
                toml::from_str(content).map_err(|e| format!("invalid TOML: {e}"))?;
            toml_to_json_value(&toml_value).map_err(|e| format!("TOML-to-JSON conversion failed: {e}"))
        }
    }
}

/// Load a document from disk.
///
/// # Errors
///
/// Returns [`SchemaValidationError::DocumentLoadError`] if the file cannot
/// be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let content = std::fs::read_to_string(path).map_err(|e| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    parse_document(&content, DocumentFormat::from_path(path)).map_err(|reason| {
        SchemaValidationError::DocumentLoadError {
            path: path.display().to_string(),
            reason,
        }
    })
}

/// Load a commitizen configuration file as `{"commitizen": {...}}`.
///
/// - TOML files: the `[tool.commitizen]` table; `.cz.toml`/`cz.toml` may
///   also use a top-level `[commitizen]` table.
/// - JSON/YAML files: returned as-is when they have a top-level
///   `commitizen` key.
///
/// The settings block itself is not checked here; that is the schema's job.
///
/// # Errors
///
/// Returns [`SchemaValidationError::DocumentLoadError`] if the file cannot
/// be loaded or holds no commitizen section.
pub fn load_commitizen_config(path: &Path) -> Result<Value, SchemaValidationError> {
    let document = load_document(path)?;
    let missing = |reason: &str| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let settings = match DocumentFormat::from_path(path) {
        DocumentFormat::Toml => {
            let from_tool = document.get("tool").and_then(|tool| tool.get("commitizen"));
            let is_pyproject = path.file_name().is_some_and(|n| n == "pyproject.toml");
            let fallback = if is_pyproject { None } else { document.get("commitizen") };
            from_tool
                .or(fallback)
                .cloned()
                .ok_or_else(|| missing("no [tool.commitizen] section"))?
        }
        DocumentFormat::Json | DocumentFormat::Yaml => {
            if document.get("commitizen").is_none() {
                return Err(missing("no top-level \"commitizen\" key"));
            }
            tracing::trace!(path = %path.display(), "loaded commitizen config");
            return Ok(document);
        }
    };

    tracing::trace!(path = %path.display(), "loaded commitizen config");
    let mut wrapped = Map::new();
    wrapped.insert("commitizen".to_string(), settings);
    Ok(Value::Object(wrapped))
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped in favour of the tagged value. Mapping keys must be
/// scalars and are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => yaml_number(n)?,
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(yaml_to_json_value).collect::<Result<_, _>>()?),
        Yaml::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((yaml_key(k)?, yaml_to_json_value(v)?)))
                .collect::<Result<_, String>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    match n.as_f64() {
        Some(f) => json_float(f),
        None => Err(format!("unsupported YAML number {n}")),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(&tagged.value),
        other => Err(format!("mapping key {other:?} cannot be an object key")),
    }
}

/// Convert a `toml::Value` to a `serde_json::Value`. Datetimes become their
/// RFC 3339 text.
pub fn toml_to_json_value(value: &toml::Value) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => json_float(*f)?,
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json_value).collect::<Result<_, _>>()?),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| Ok((k.clone(), toml_to_json_value(v)?)))
                .collect::<Result<_, String>>()?,
        ),
    })
}

/// NaN and the infinities have no JSON form.
fn json_float(f: f64) -> Result<Value, String> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| format!("float {f} cannot be represented in JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new(".cz.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("pyproject.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new(".cz.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), DocumentFormat::Json);
    }

    #[test]
    fn yaml_settings_convert_to_json() {
        let yaml_str = r#"
commitizen:
  name: cz_conventional_commits
  version: "1.0.0"
  prerelease_offset: 0
  gpg_sign: false
  version_files:
    - src/__version__.py
"#;
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();

        assert_eq!(json_value["commitizen"]["name"], "cz_conventional_commits");
        assert_eq!(json_value["commitizen"]["version"], "1.0.0");
        assert_eq!(json_value["commitizen"]["prerelease_offset"], 0);
        assert_eq!(json_value["commitizen"]["gpg_sign"], false);
        assert_eq!(json_value["commitizen"]["version_files"][0], "src/__version__.py");
    }

    #[test]
    fn yaml_keys_and_tags() {
        let value = parse_document("1: one\ntrue: yes\ntagged: !custom 3\n", DocumentFormat::Yaml).unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes", "tagged": 3}));

        let err = parse_document("? [a, b]\n: c\n", DocumentFormat::Yaml).unwrap_err();
        assert!(err.starts_with("YAML-to-JSON conversion failed"), "{err}");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let err = parse_document("limit: .nan\n", DocumentFormat::Yaml).unwrap_err();
        assert!(err.contains("cannot be represented"), "{err}");
        let err = parse_document("limit = inf\n", DocumentFormat::Toml).unwrap_err();
        assert!(err.contains("cannot be represented"), "{err}");
    }

    #[test]
    fn yaml_unquoted_version_is_a_number() {
        // An unquoted 1.0 is a YAML float; the schema must see a number.
        let json_value = parse_document("version: 1.0\n", DocumentFormat::Yaml).unwrap();
        assert!(json_value["version"].is_number());
    }

    #[test]
    fn toml_conversion_keeps_types() {
        let value = parse_document(
            "[tool.commitizen]\nname = \"cz_customize\"\nmessage_length_limit = 100\nannotated_tag = true\nratio = 0.5\n",
            DocumentFormat::Toml,
        )
        .unwrap();
        let settings = &value["tool"]["commitizen"];
        assert_eq!(settings["name"], "cz_customize");
        assert_eq!(settings["message_length_limit"], 100);
        assert_eq!(settings["annotated_tag"], true);
        assert_eq!(settings["ratio"], 0.5);
    }

    #[test]
    fn invalid_documents_report_format() {
        let err = parse_document("{not json", DocumentFormat::Json).unwrap_err();
        assert!(err.starts_with("invalid JSON"));
        let err = parse_document("a = [", DocumentFormat::Toml).unwrap_err();
        assert!(err.starts_with("invalid TOML"));
    }

    #[test]
    fn pyproject_section_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "pyproject.toml",
            "[project]\nname = \"demo\"\n\n[tool.commitizen]\nname = \"cz_conventional_commits\"\nversion = \"0.1.0\"\n",
        );
        let config = load_commitizen_config(&path).unwrap();
        assert_eq!(
            config,
            json!({"commitizen": {"name": "cz_conventional_commits", "version": "0.1.0"}})
        );
    }

    #[test]
    fn pyproject_without_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "pyproject.toml", "[commitizen]\nname = \"x\"\n");
        let err = load_commitizen_config(&path).unwrap_err();
        assert!(matches!(err, SchemaValidationError::DocumentLoadError { .. }));
    }

    #[test]
    fn cz_toml_accepts_top_level_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, ".cz.toml", "[commitizen]\nname = \"cz_conventional_commits\"\n");
        let config = load_commitizen_config(&path).unwrap();
        assert_eq!(config["commitizen"]["name"], "cz_conventional_commits");
    }

    #[test]
    fn json_config_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, ".cz.json", r#"{"commitizen": {"gpg_sign": true}}"#);
        let config = load_commitizen_config(&path).unwrap();
        assert_eq!(config, json!({"commitizen": {"gpg_sign": true}}));

        let other = write(&dir, "other.json", r#"{"name": "x"}"#);
        assert!(load_commitizen_config(&other).is_err());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_document(Path::new("/nonexistent/.cz.json")).unwrap_err();
        match err {
            SchemaValidationError::DocumentLoadError { reason, .. } => {
                assert!(reason.contains("cannot read file"));
            }
            other => panic!("expected DocumentLoadError, got {other}"),
        }
    }
}
