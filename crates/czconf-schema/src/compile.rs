//! # Schema Compilation
//!
//! Turns a schema document into a [`Schema`]. Compilation doubles as the
//! meta-schema self-check: every keyword is shape-checked against the
//! Draft 7 vocabulary, patterns are compiled, bounds are checked for
//! contradictions, and local references are resolved and checked for
//! cycles. A document that compiles is well-formed.
//!
//! ## Supported vocabulary
//!
//! `type`, `enum`, `const`, `properties`, `required`,
//! `additionalProperties`, `minProperties`, `maxProperties`, `items`,
//! `additionalItems`, `minItems`, `maxItems`, `pattern`, `minLength`,
//! `maxLength`, `minimum`, `maximum`, `exclusiveMinimum`,
//! `exclusiveMaximum`, `allOf`, `anyOf`, `oneOf`, `not`, `$ref`,
//! `definitions`.
//!
//! Annotations (`$schema`, `$id`, `$comment`, `title`, `description`,
//! `default`, `examples`, `format`, ...) are accepted and ignored. Draft 7
//! assertion keywords outside the vocabulary are rejected with
//! [`SchemaError::UnsupportedKeyword`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Number, Value};

use crate::error::SchemaError;
use crate::node::{
    Additional, ArrayRules, Composition, Items, JsonType, Keywords, NodeBody, NumberRules,
    ObjectRules, Reference, Schema, SchemaMeta, SchemaNode, StringRules, TypeSet,
};
use crate::pattern::Pattern;
use crate::value;

/// Meta-schema URIs accepted in `$schema`.
const DRAFT7_URIS: &[&str] = &[
    "http://json-schema.org/draft-07/schema#",
    "http://json-schema.org/draft-07/schema",
    "https://json-schema.org/draft-07/schema#",
    "https://json-schema.org/draft-07/schema",
];

const ROOT: &str = "#";

const ASSERTION_KEYWORDS: &[&str] = &[
    "type",
    "enum",
    "const",
    "properties",
    "required",
    "additionalProperties",
    "minProperties",
    "maxProperties",
    "items",
    "additionalItems",
    "minItems",
    "maxItems",
    "pattern",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "$ref",
    "definitions",
];

const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
    "readOnly",
    "writeOnly",
    "format",
    "contentMediaType",
    "contentEncoding",
];

const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "multipleOf",
    "uniqueItems",
    "contains",
    "patternProperties",
    "propertyNames",
    "dependencies",
    "if",
    "then",
    "else",
];

/// Compiler configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject keywords that are neither part of the vocabulary nor known
    /// annotations. Off by default: Draft 7 ignores unknown keywords.
    pub deny_unknown_keywords: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_unknown_keywords(mut self, deny: bool) -> Self {
        self.deny_unknown_keywords = deny;
        self
    }
}

/// Compile a schema document with default options.
///
/// # Errors
///
/// Returns [`SchemaError`] if the document is not a well-formed Draft 7
/// schema.
pub fn compile(document: &Value) -> Result<Schema, SchemaError> {
    compile_with(document, CompileOptions::default())
}

/// Compile a schema document.
///
/// # Errors
///
/// Returns [`SchemaError`] if the document is not a well-formed Draft 7
/// schema.
pub fn compile_with(document: &Value, options: CompileOptions) -> Result<Schema, SchemaError> {
    if let Some(declared) = document.get("$schema") {
        let uri = declared.as_str().ok_or_else(|| SchemaError::InvalidKeyword {
            location: pointer(ROOT, "$schema"),
            keyword: "$schema",
            reason: "must be a string".to_string(),
        })?;
        if !DRAFT7_URIS.contains(&uri) {
            return Err(SchemaError::UnsupportedDraft {
                uri: uri.to_string(),
            });
        }
    }

    let mut compiler = Compiler {
        options,
        references: Vec::new(),
    };

    let mut definitions = BTreeMap::new();
    if let Some(defs) = document.get("definitions") {
        let defs = defs.as_object().ok_or_else(|| SchemaError::InvalidKeyword {
            location: pointer(ROOT, "definitions"),
            keyword: "definitions",
            reason: "must be an object".to_string(),
        })?;
        for (name, sub) in defs {
            let location = pointer(&pointer(ROOT, "definitions"), name);
            definitions.insert(name.clone(), compiler.node(sub, &location)?);
        }
    }

    let root = compiler.node(document, ROOT)?;

    let schema = Schema {
        root,
        definitions,
        meta: SchemaMeta {
            id: annotation(document, "$id"),
            title: annotation(document, "title"),
            description: annotation(document, "description"),
        },
    };

    for (location, reference) in &compiler.references {
        if schema.resolve(reference).is_none() {
            return Err(SchemaError::UnresolvedReference {
                location: location.clone(),
                reference: reference.to_string(),
            });
        }
    }
    check_reference_cycles(&schema)?;

    tracing::debug!(
        title = schema.meta.title.as_deref().unwrap_or(""),
        nodes = schema.node_count(),
        definitions = schema.definitions.len(),
        references = compiler.references.len(),
        "compiled schema"
    );

    Ok(schema)
}

/// Meta-schema self-check: succeeds iff `document` compiles.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found.
pub fn check_schema(document: &Value) -> Result<(), SchemaError> {
    compile(document).map(|_| ())
}

fn annotation(document: &Value, keyword: &str) -> Option<String> {
    document.get(keyword).and_then(Value::as_str).map(str::to_string)
}

/// Append a JSON Pointer token, escaping `~` and `/`.
fn pointer(base: &str, token: &str) -> String {
    format!("{base}/{}", token.replace('~', "~0").replace('/', "~1"))
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

struct Compiler {
    options: CompileOptions,
    /// Every `$ref` seen, with its location, for resolution after the
    /// definitions table is complete.
    references: Vec<(String, Reference)>,
}

impl Compiler {
    fn node(&mut self, document: &Value, location: &str) -> Result<SchemaNode, SchemaError> {
        match document {
            Value::Bool(true) => Ok(SchemaNode::new(location, NodeBody::Accept)),
            Value::Bool(false) => Ok(SchemaNode::new(location, NodeBody::Reject)),
            Value::Object(map) => self.object_node(map, location),
            other => Err(SchemaError::InvalidSchemaType {
                location: location.to_string(),
                found: value::type_name(other),
            }),
        }
    }

    fn object_node(&mut self, map: &Map<String, Value>, location: &str) -> Result<SchemaNode, SchemaError> {
        for keyword in map.keys() {
            let keyword = keyword.as_str();
            if UNSUPPORTED_KEYWORDS.contains(&keyword) {
                return Err(SchemaError::UnsupportedKeyword {
                    location: location.to_string(),
                    keyword: keyword.to_string(),
                });
            }
            if self.options.deny_unknown_keywords
                && !ASSERTION_KEYWORDS.contains(&keyword)
                && !ANNOTATION_KEYWORDS.contains(&keyword)
            {
                return Err(SchemaError::UnknownKeyword {
                    location: location.to_string(),
                    keyword: keyword.to_string(),
                });
            }
        }

        // Nested definitions cannot be referenced, but must still be
        // well-formed schemas.
        if location != ROOT {
            if let Some(defs) = map.get("definitions") {
                let defs_location = pointer(location, "definitions");
                let defs = defs.as_object().ok_or_else(|| SchemaError::InvalidKeyword {
                    location: defs_location.clone(),
                    keyword: "definitions",
                    reason: "must be an object".to_string(),
                })?;
                for (name, sub) in defs {
                    self.node(sub, &pointer(&defs_location, name))?;
                }
            }
        }

        if let Some(target) = map.get("$ref") {
            let ref_location = pointer(location, "$ref");
            let reference = parse_reference(target, &ref_location)?;
            self.references.push((ref_location, reference.clone()));
            return Ok(SchemaNode::new(location, NodeBody::Ref(reference)));
        }

        let keywords = Keywords {
            types: self.types(map, location)?,
            enumeration: self.enumeration(map, location)?,
            constant: map.get("const").cloned(),
            object: self.object_rules(map, location)?,
            array: self.array_rules(map, location)?,
            string: self.string_rules(map, location)?,
            number: self.number_rules(map, location)?,
            composition: self.composition(map, location)?,
        };

        if keywords == Keywords::default() {
            return Ok(SchemaNode::new(location, NodeBody::Accept));
        }
        Ok(SchemaNode::new(location, NodeBody::Keywords(Box::new(keywords))))
    }

    fn types(&self, map: &Map<String, Value>, location: &str) -> Result<Option<TypeSet>, SchemaError> {
        let Some(declared) = map.get("type") else {
            return Ok(None);
        };
        let type_location = pointer(location, "type");
        let tokens: Vec<&Value> = match declared {
            Value::String(_) => vec![declared],
            Value::Array(items) if !items.is_empty() => items.iter().collect(),
            _ => {
                return Err(SchemaError::InvalidKeyword {
                    location: type_location,
                    keyword: "type",
                    reason: "must be a type name or a non-empty array of type names".to_string(),
                })
            }
        };

        let mut set = TypeSet::EMPTY;
        for token in tokens {
            let name = token.as_str().ok_or_else(|| SchemaError::InvalidKeyword {
                location: type_location.clone(),
                keyword: "type",
                reason: format!("type names must be strings, found {}", value::type_name(token)),
            })?;
            let ty = JsonType::parse(name).ok_or_else(|| SchemaError::UnknownType {
                location: type_location.clone(),
                name: name.to_string(),
            })?;
            if !set.insert(ty) {
                return Err(SchemaError::InvalidKeyword {
                    location: type_location,
                    keyword: "type",
                    reason: format!("type \"{name}\" is listed twice"),
                });
            }
        }
        Ok(Some(set))
    }

    fn enumeration(&self, map: &Map<String, Value>, location: &str) -> Result<Option<Vec<Value>>, SchemaError> {
        match map.get("enum") {
            None => Ok(None),
            Some(Value::Array(members)) if !members.is_empty() => Ok(Some(members.clone())),
            Some(_) => Err(SchemaError::InvalidKeyword {
                location: pointer(location, "enum"),
                keyword: "enum",
                reason: "must be a non-empty array".to_string(),
            }),
        }
    }

    fn object_rules(&mut self, map: &Map<String, Value>, location: &str) -> Result<ObjectRules, SchemaError> {
        let mut rules = ObjectRules::default();

        if let Some(properties) = map.get("properties") {
            let props_location = pointer(location, "properties");
            let properties = properties.as_object().ok_or_else(|| SchemaError::InvalidKeyword {
                location: props_location.clone(),
                keyword: "properties",
                reason: "must be an object".to_string(),
            })?;
            for (name, sub) in properties {
                let node = self.node(sub, &pointer(&props_location, name))?;
                rules.properties.push((name.clone(), node));
            }
        }

        if let Some(required) = map.get("required") {
            let required_location = pointer(location, "required");
            let invalid = |reason: &str| SchemaError::InvalidKeyword {
                location: required_location.clone(),
                keyword: "required",
                reason: reason.to_string(),
            };
            let names = required.as_array().ok_or_else(|| invalid("must be an array"))?;
            let mut seen = BTreeSet::new();
            for name in names {
                let name = name.as_str().ok_or_else(|| invalid("entries must be strings"))?;
                if !seen.insert(name) {
                    return Err(invalid(&format!("\"{name}\" is listed twice")));
                }
                rules.required.push(name.to_string());
            }
        }

        rules.additional = self.additional(map, location, "additionalProperties")?;
        rules.min_properties = non_negative(map, location, "minProperties")?;
        rules.max_properties = non_negative(map, location, "maxProperties")?;
        check_order(location, ("minProperties", rules.min_properties), ("maxProperties", rules.max_properties))?;
        Ok(rules)
    }

    fn array_rules(&mut self, map: &Map<String, Value>, location: &str) -> Result<ArrayRules, SchemaError> {
        let mut rules = ArrayRules::default();

        if let Some(items) = map.get("items") {
            let items_location = pointer(location, "items");
            rules.items = Some(match items {
                Value::Array(positional) => {
                    let mut nodes = Vec::with_capacity(positional.len());
                    for (index, sub) in positional.iter().enumerate() {
                        nodes.push(self.node(sub, &pointer(&items_location, &index.to_string()))?);
                    }
                    Items::Tuple(nodes)
                }
                other => Items::Each(Box::new(self.node(other, &items_location)?)),
            });
        }

        rules.additional_items = self.additional(map, location, "additionalItems")?;
        rules.min_items = non_negative(map, location, "minItems")?;
        rules.max_items = non_negative(map, location, "maxItems")?;
        check_order(location, ("minItems", rules.min_items), ("maxItems", rules.max_items))?;
        Ok(rules)
    }

    fn string_rules(&self, map: &Map<String, Value>, location: &str) -> Result<StringRules, SchemaError> {
        let mut rules = StringRules::default();

        if let Some(pattern) = map.get("pattern") {
            let pattern_location = pointer(location, "pattern");
            let source = pattern.as_str().ok_or_else(|| SchemaError::InvalidKeyword {
                location: pattern_location.clone(),
                keyword: "pattern",
                reason: "must be a string".to_string(),
            })?;
            let compiled = Pattern::new(source).map_err(|e| SchemaError::InvalidPattern {
                location: pattern_location,
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
            rules.pattern = Some(compiled);
        }

        rules.min_length = non_negative(map, location, "minLength")?;
        rules.max_length = non_negative(map, location, "maxLength")?;
        check_order(location, ("minLength", rules.min_length), ("maxLength", rules.max_length))?;
        Ok(rules)
    }

    fn number_rules(&self, map: &Map<String, Value>, location: &str) -> Result<NumberRules, SchemaError> {
        let rules = NumberRules {
            minimum: number(map, location, "minimum")?,
            maximum: number(map, location, "maximum")?,
            exclusive_minimum: number(map, location, "exclusiveMinimum")?,
            exclusive_maximum: number(map, location, "exclusiveMaximum")?,
        };
        if let (Some(lower), Some(upper)) = (&rules.minimum, &rules.maximum) {
            if value::compare_numbers(lower, upper) == Some(Ordering::Greater) {
                return Err(SchemaError::ContradictoryBounds {
                    location: location.to_string(),
                    lower: "minimum",
                    lower_value: lower.as_f64().unwrap_or(f64::NAN),
                    upper: "maximum",
                    upper_value: upper.as_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(rules)
    }

    fn composition(&mut self, map: &Map<String, Value>, location: &str) -> Result<Composition, SchemaError> {
        let not = match map.get("not") {
            Some(sub) => Some(Box::new(self.node(sub, &pointer(location, "not"))?)),
            None => None,
        };
        Ok(Composition {
            all_of: self.branches(map, location, "allOf")?,
            any_of: self.branches(map, location, "anyOf")?,
            one_of: self.branches(map, location, "oneOf")?,
            not,
        })
    }

    fn branches(
        &mut self,
        map: &Map<String, Value>,
        location: &str,
        keyword: &'static str,
    ) -> Result<Vec<SchemaNode>, SchemaError> {
        let Some(declared) = map.get(keyword) else {
            return Ok(Vec::new());
        };
        let keyword_location = pointer(location, keyword);
        let branches = match declared {
            Value::Array(branches) if !branches.is_empty() => branches,
            _ => {
                return Err(SchemaError::InvalidKeyword {
                    location: keyword_location,
                    keyword,
                    reason: "must be a non-empty array of schemas".to_string(),
                })
            }
        };
        let mut nodes = Vec::with_capacity(branches.len());
        for (index, sub) in branches.iter().enumerate() {
            nodes.push(self.node(sub, &pointer(&keyword_location, &index.to_string()))?);
        }
        Ok(nodes)
    }

    fn additional(
        &mut self,
        map: &Map<String, Value>,
        location: &str,
        keyword: &'static str,
    ) -> Result<Additional, SchemaError> {
        Ok(match map.get(keyword) {
            None | Some(Value::Bool(true)) => Additional::Allow,
            Some(Value::Bool(false)) => Additional::Forbid,
            Some(sub) => Additional::Schema(Box::new(self.node(sub, &pointer(location, keyword))?)),
        })
    }
}

fn parse_reference(target: &Value, location: &str) -> Result<Reference, SchemaError> {
    let text = target.as_str().ok_or_else(|| SchemaError::InvalidKeyword {
        location: location.to_string(),
        keyword: "$ref",
        reason: "must be a string".to_string(),
    })?;
    let unsupported = || SchemaError::UnsupportedReference {
        location: location.to_string(),
        reference: text.to_string(),
    };
    let fragment = text
        .strip_prefix('#')
        .and_then(percent_decode)
        .ok_or_else(unsupported)?;
    if fragment.is_empty() || fragment == "/" {
        return Ok(Reference::Root);
    }
    match fragment.strip_prefix("/definitions/") {
        Some(name) if !name.is_empty() && !name.contains('/') => {
            Ok(Reference::Definition(unescape_token(name)))
        }
        _ => Err(unsupported()),
    }
}

/// Decode `%XX` escapes in a URI fragment. `None` for a truncated or
/// non-hex escape, or bytes that are not UTF-8.
fn percent_decode(fragment: &str) -> Option<String> {
    if !fragment.contains('%') {
        return Some(fragment.to_string());
    }
    let mut bytes = Vec::with_capacity(fragment.len());
    let mut rest = fragment.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        if b != b'%' {
            bytes.push(b);
            rest = tail;
            continue;
        }
        let hex = tail.get(..2).filter(|h| h.iter().all(u8::is_ascii_hexdigit))?;
        bytes.push(u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?);
        rest = &tail[2..];
    }
    String::from_utf8(bytes).ok()
}

fn non_negative(map: &Map<String, Value>, location: &str, keyword: &'static str) -> Result<Option<u64>, SchemaError> {
    let Some(declared) = map.get(keyword) else {
        return Ok(None);
    };
    let count = declared.as_u64().or_else(|| {
        declared
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });
    count.map(Some).ok_or_else(|| SchemaError::InvalidKeyword {
        location: pointer(location, keyword),
        keyword,
        reason: format!("must be a non-negative integer, found {declared}"),
    })
}

fn number(map: &Map<String, Value>, location: &str, keyword: &'static str) -> Result<Option<Number>, SchemaError> {
    let Some(declared) = map.get(keyword) else {
        return Ok(None);
    };
    match declared {
        Value::Number(n) => Ok(Some(n.clone())),
        _ => Err(SchemaError::InvalidKeyword {
            location: pointer(location, keyword),
            keyword,
            reason: format!("must be a number, found {declared}"),
        }),
    }
}

fn check_order(
    location: &str,
    (lower, lower_value): (&'static str, Option<u64>),
    (upper, upper_value): (&'static str, Option<u64>),
) -> Result<(), SchemaError> {
    match (lower_value, upper_value) {
        (Some(low), Some(high)) if low > high => Err(SchemaError::ContradictoryBounds {
            location: location.to_string(),
            lower,
            lower_value: low as f64,
            upper,
            upper_value: high as f64,
        }),
        _ => Ok(()),
    }
}

/// References reachable from `node` without descending into the instance:
/// a `$ref` itself, or one inside a composition branch.
fn in_place_references<'a>(node: &'a SchemaNode, out: &mut Vec<&'a Reference>) {
    match node.body() {
        NodeBody::Ref(reference) => out.push(reference),
        NodeBody::Keywords(k) => {
            for branch in k.composition.branches() {
                in_place_references(branch, out);
            }
        }
        NodeBody::Accept | NodeBody::Reject => {}
    }
}

fn check_reference_cycles(schema: &Schema) -> Result<(), SchemaError> {
    let mut targets = vec![Reference::Root];
    targets.extend(schema.definition_names().map(|name| Reference::Definition(name.to_string())));

    let mut finished = BTreeSet::new();
    for start in &targets {
        let mut stack = Vec::new();
        visit(schema, start, &mut stack, &mut finished)?;
    }
    Ok(())
}

fn visit(
    schema: &Schema,
    target: &Reference,
    stack: &mut Vec<Reference>,
    finished: &mut BTreeSet<Reference>,
) -> Result<(), SchemaError> {
    if finished.contains(target) {
        return Ok(());
    }
    if let Some(start) = stack.iter().position(|r| r == target) {
        let chain: Vec<String> = stack[start..]
            .iter()
            .chain(std::iter::once(target))
            .map(ToString::to_string)
            .collect();
        return Err(SchemaError::ReferenceCycle {
            chain: chain.join(" -> "),
        });
    }
    let Some(node) = schema.resolve(target) else {
        return Ok(());
    };

    stack.push(target.clone());
    let mut next = Vec::new();
    in_place_references(node, &mut next);
    for reference in next {
        visit(schema, reference, stack, finished)?;
    }
    stack.pop();
    finished.insert(target.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_and_true_accept_everything() {
        assert_eq!(compile(&json!({})).unwrap().root().body(), &NodeBody::Accept);
        assert_eq!(compile(&json!(true)).unwrap().root().body(), &NodeBody::Accept);
        assert_eq!(compile(&json!(false)).unwrap().root().body(), &NodeBody::Reject);
    }

    #[test]
    fn annotations_only_compile_to_accept() {
        let schema = compile(&json!({"title": "t", "description": "d", "default": 3})).unwrap();
        assert_eq!(schema.root().body(), &NodeBody::Accept);
        assert_eq!(schema.meta().title.as_deref(), Some("t"));
    }

    #[test]
    fn non_schema_values_are_rejected() {
        let err = compile(&json!({"properties": {"a": 3}})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidSchemaType {
                location: "#/properties/a".to_string(),
                found: "integer",
            }
        );
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let err = compile(&json!({"type": "bool"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref name, .. } if name == "bool"));
    }

    #[test]
    fn duplicate_type_name_is_rejected() {
        let err = compile(&json!({"type": ["string", "string"]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { keyword: "type", .. }));
    }

    #[test]
    fn malformed_pattern_is_rejected_with_location() {
        let err = compile(&json!({"properties": {"v": {"pattern": "(\\d+"}}})).unwrap_err();
        match err {
            SchemaError::InvalidPattern { location, pattern, .. } => {
                assert_eq!(location, "#/properties/v/pattern");
                assert_eq!(pattern, "(\\d+");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn required_must_be_unique_strings() {
        assert!(compile(&json!({"required": "name"})).is_err());
        assert!(compile(&json!({"required": [1]})).is_err());
        assert!(compile(&json!({"required": ["a", "a"]})).is_err());
        assert!(compile(&json!({"required": []})).is_ok());
    }

    #[test]
    fn enum_must_be_non_empty_array() {
        assert!(compile(&json!({"enum": []})).is_err());
        assert!(compile(&json!({"enum": "a"})).is_err());
        assert!(compile(&json!({"enum": [null]})).is_ok());
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        assert!(compile(&json!({"minItems": -1})).is_err());
        assert!(compile(&json!({"maxLength": 1.5})).is_err());
        assert!(compile(&json!({"minProperties": "2"})).is_err());
        assert!(compile(&json!({"minItems": 2.0})).is_ok());
    }

    #[test]
    fn contradictory_bounds_are_rejected() {
        let err = compile(&json!({"minItems": 3, "maxItems": 2})).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ContradictoryBounds { lower: "minItems", upper: "maxItems", .. }
        ));
        assert!(compile(&json!({"minimum": 5, "maximum": 1})).is_err());
        assert!(compile(&json!({"minLength": 2, "maxLength": 2})).is_ok());
    }

    #[test]
    fn bounds_must_be_numbers() {
        assert!(compile(&json!({"minimum": "0"})).is_err());
        assert!(compile(&json!({"exclusiveMaximum": true})).is_err());
    }

    #[test]
    fn composition_requires_non_empty_arrays() {
        assert!(compile(&json!({"anyOf": []})).is_err());
        assert!(compile(&json!({"allOf": {"type": "string"}})).is_err());
        assert!(compile(&json!({"oneOf": [{"type": "string"}, 3]})).is_err());
        assert!(compile(&json!({"not": {"type": "null"}})).is_ok());
    }

    #[test]
    fn tuple_items_keep_positions() {
        let schema = compile(&json!({"items": [{"type": "string"}, {"type": "integer"}]})).unwrap();
        let k = schema.root().keywords().unwrap();
        match &k.array.items {
            Some(Items::Tuple(nodes)) => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(nodes[1].location(), "#/items/1");
            }
            other => panic!("expected tuple items, got {other:?}"),
        }
    }

    #[test]
    fn definitions_resolve() {
        let schema = compile(&json!({
            "definitions": {"name": {"type": "string"}},
            "properties": {"n": {"$ref": "#/definitions/name"}}
        }))
        .unwrap();
        assert!(schema.definition("name").is_some());
        assert_eq!(schema.definition_names().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn missing_definition_is_unresolved() {
        let err = compile(&json!({"properties": {"n": {"$ref": "#/definitions/nope"}}})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnresolvedReference {
                location: "#/properties/n/$ref".to_string(),
                reference: "#/definitions/nope".to_string(),
            }
        );
    }

    #[test]
    fn percent_encoded_definition_names_resolve() {
        let schema = compile(&json!({
            "definitions": {"a b": {"type": "string"}, "é": {"type": "integer"}},
            "properties": {
                "spaced": {"$ref": "#/definitions/a%20b"},
                "accented": {"$ref": "#/definitions/%C3%A9"}
            }
        }))
        .unwrap();
        assert!(schema.validate(&json!({"spaced": "x", "accented": 1})).is_valid());
        assert!(!schema.validate(&json!({"spaced": 1})).is_valid());
    }

    #[test]
    fn malformed_percent_escape_is_unsupported() {
        for reference in ["#/definitions/a%2", "#/definitions/a%zz", "#/definitions/%FF"] {
            let err = compile(&json!({"definitions": {"a": {}}, "$ref": reference})).unwrap_err();
            assert!(
                matches!(err, SchemaError::UnsupportedReference { .. }),
                "{reference}: {err:?}"
            );
        }
    }

    #[test]
    fn remote_references_are_unsupported() {
        let err = compile(&json!({"$ref": "https://example.org/schema.json"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedReference { .. }));
    }

    #[test]
    fn escaped_definition_names_resolve() {
        let schema = compile(&json!({
            "definitions": {"a/b": {"type": "string"}},
            "$ref": "#/definitions/a~1b"
        }))
        .unwrap();
        assert_eq!(
            schema.root().body(),
            &NodeBody::Ref(Reference::Definition("a/b".to_string()))
        );
    }

    #[test]
    fn direct_reference_cycle_is_rejected() {
        let err = compile(&json!({
            "definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"allOf": [{"$ref": "#/definitions/a"}]}},
            "$ref": "#/definitions/a"
        }))
        .unwrap_err();
        match err {
            SchemaError::ReferenceCycle { chain } => {
                assert!(chain.contains("#/definitions/a"));
                assert!(chain.contains("#/definitions/b"));
            }
            other => panic!("expected ReferenceCycle, got {other:?}"),
        }
    }

    #[test]
    fn recursion_through_structure_is_allowed() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {"children": {"type": "array", "items": {"$ref": "#"}}}
        }));
        assert!(schema.is_ok());
    }

    #[test]
    fn other_drafts_are_rejected() {
        let err = compile(&json!({"$schema": "https://json-schema.org/draft/2020-12/schema"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedDraft { .. }));
        assert!(compile(&json!({"$schema": "http://json-schema.org/draft-07/schema#"})).is_ok());
    }

    #[test]
    fn unsupported_assertions_are_rejected() {
        let err = compile(&json!({"type": "array", "uniqueItems": true})).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedKeyword { ref keyword, .. } if keyword == "uniqueItems"));
    }

    #[test]
    fn unknown_keywords_follow_options() {
        let doc = json!({"type": "string", "x-editor-hint": "multiline"});
        assert!(compile(&doc).is_ok());
        let err = compile_with(&doc, CompileOptions::new().deny_unknown_keywords(true)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownKeyword { ref keyword, .. } if keyword == "x-editor-hint"));
    }

    #[test]
    fn nested_definitions_are_checked() {
        let err = compile(&json!({"properties": {"a": {"definitions": {"x": {"type": "wat"}}}}})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn ref_siblings_are_ignored() {
        let schema = compile(&json!({
            "definitions": {"s": {"type": "string"}},
            "properties": {"a": {"$ref": "#/definitions/s", "type": "integer"}}
        }))
        .unwrap();
        let k = schema.root().keywords().unwrap();
        assert!(matches!(k.object.property("a").unwrap().body(), NodeBody::Ref(_)));
    }

    #[test]
    fn check_schema_reports_first_error() {
        assert!(check_schema(&json!({"type": "object"})).is_ok());
        assert!(check_schema(&json!({"type": 5})).is_err());
    }
}
