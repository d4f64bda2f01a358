//! # Compiled Schema Model
//!
//! A [`Schema`] is the immutable result of compiling a schema document: a
//! root [`SchemaNode`] plus the compiled `definitions` table that local
//! `$ref`s resolve against. Every node exclusively owns its children.
//!
//! Nodes record their location in the schema document as a JSON Pointer
//! rooted at `#` (e.g. `#/properties/commitizen/properties/version`), which
//! violations report as their schema path.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Number, Value};

use crate::pattern::Pattern;
use crate::value;

/// The seven JSON Schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl JsonType {
    /// All type names, in declaration order.
    pub const ALL: [JsonType; 7] = [
        JsonType::Null,
        JsonType::Boolean,
        JsonType::Object,
        JsonType::Array,
        JsonType::Number,
        JsonType::Integer,
        JsonType::String,
    ];

    /// Parse a `type` token.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// The schema spelling of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::String => "string",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`JsonType`]s from the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    /// The empty set.
    pub const EMPTY: TypeSet = TypeSet(0);

    /// Add a type. Returns `false` if it was already present.
    pub fn insert(&mut self, ty: JsonType) -> bool {
        let present = self.contains(ty);
        self.0 |= ty.bit();
        !present
    }

    /// Whether `ty` was declared.
    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Declared types in declaration-independent canonical order.
    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        JsonType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Whether an instance's runtime type is a member of the set. An
    /// integer instance is admitted by `number`.
    pub fn admits(self, instance: &Value) -> bool {
        let actual = value::type_of(instance);
        self.contains(actual) || (actual == JsonType::Integer && self.contains(JsonType::Number))
    }
}

impl FromIterator<JsonType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = JsonType>>(iter: I) -> Self {
        let mut set = TypeSet::EMPTY;
        for ty in iter {
            set.insert(ty);
        }
        set
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{ty}\"")?;
        }
        Ok(())
    }
}

/// A local `$ref` target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Reference {
    /// `#`, the document root.
    Root,
    /// `#/definitions/<name>`.
    Definition(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Root => f.write_str("#"),
            Reference::Definition(name) => write!(f, "#/definitions/{name}"),
        }
    }
}

/// Policy for object members not named in `properties`, and for array
/// elements past a tuple `items` list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Additional {
    #[default]
    Allow,
    Forbid,
    Schema(Box<SchemaNode>),
}

/// The `items` keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema applied to every element.
    Each(Box<SchemaNode>),
    /// Positional schemas.
    Tuple(Vec<SchemaNode>),
}

/// Keywords that apply to objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectRules {
    /// Declared properties in schema document order.
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub additional: Additional,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

impl ObjectRules {
    /// Look up a declared property.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, node)| node)
    }
}

/// Keywords that apply to arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayRules {
    pub items: Option<Items>,
    /// Only consulted when `items` is a tuple.
    pub additional_items: Additional,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// Keywords that apply to strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringRules {
    pub pattern: Option<Pattern>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// Keywords that apply to numbers.
#[derive(Debug, Clone, PartialEq, Default)]
///
/// Bounds keep the number as written so integer bounds compare exactly.
pub struct NumberRules {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
}

/// `allOf` / `anyOf` / `oneOf` / `not`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composition {
    pub all_of: Vec<SchemaNode>,
    pub any_of: Vec<SchemaNode>,
    pub one_of: Vec<SchemaNode>,
    pub not: Option<Box<SchemaNode>>,
}

impl Composition {
    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty() && self.one_of.is_empty() && self.not.is_none()
    }

    /// Branches evaluated against the same instance position.
    pub fn branches(&self) -> impl Iterator<Item = &SchemaNode> {
        self.all_of
            .iter()
            .chain(&self.any_of)
            .chain(&self.one_of)
            .chain(self.not.as_deref())
    }
}

/// The assertion keywords of an object-form schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keywords {
    pub types: Option<TypeSet>,
    pub enumeration: Option<Vec<Value>>,
    pub constant: Option<Value>,
    pub object: ObjectRules,
    pub array: ArrayRules,
    pub string: StringRules,
    pub number: NumberRules,
    pub composition: Composition,
}

/// What a node asserts.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// The `true` schema (or `{}`): everything is valid.
    Accept,
    /// The `false` schema: nothing is valid.
    Reject,
    /// A `$ref`; sibling keywords are ignored.
    Ref(Reference),
    Keywords(Box<Keywords>),
}

/// Constraints for one JSON value position.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    location: String,
    body: NodeBody,
}

impl SchemaNode {
    pub(crate) fn new(location: impl Into<String>, body: NodeBody) -> Self {
        Self {
            location: location.into(),
            body,
        }
    }

    /// JSON Pointer of this node in the schema document.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// The keyword set, if this node is an object-form schema.
    pub fn keywords(&self) -> Option<&Keywords> {
        match &self.body {
            NodeBody::Keywords(k) => Some(k),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let Some(k) = self.keywords() else {
            return 1;
        };
        let mut count = 1;
        count += k.object.properties.iter().map(|(_, n)| n.node_count()).sum::<usize>();
        if let Additional::Schema(n) = &k.object.additional {
            count += n.node_count();
        }
        match &k.array.items {
            Some(Items::Each(n)) => count += n.node_count(),
            Some(Items::Tuple(nodes)) => count += nodes.iter().map(SchemaNode::node_count).sum::<usize>(),
            None => {}
        }
        if let Additional::Schema(n) = &k.array.additional_items {
            count += n.node_count();
        }
        count + k.composition.branches().map(SchemaNode::node_count).sum::<usize>()
    }
}

/// Descriptive annotations of the root schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A compiled schema document.
///
/// Immutable and `Send + Sync`: compile once, then validate any number of
/// instances, from any number of threads, by shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) root: SchemaNode,
    pub(crate) definitions: BTreeMap<String, SchemaNode>,
    pub(crate) meta: SchemaMeta,
}

impl Schema {
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn meta(&self) -> &SchemaMeta {
        &self.meta
    }

    /// A compiled entry of the root `definitions` table.
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    /// Names of all root definitions, sorted.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Resolve a reference to its target node.
    pub fn resolve(&self, reference: &Reference) -> Option<&SchemaNode> {
        match reference {
            Reference::Root => Some(&self.root),
            Reference::Definition(name) => self.definitions.get(name),
        }
    }

    /// Total compiled nodes across the root and all definitions.
    pub fn node_count(&self) -> usize {
        self.root.node_count() + self.definitions.values().map(SchemaNode::node_count).sum::<usize>()
    }
}
