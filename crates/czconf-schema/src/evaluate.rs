//! # Validation
//!
//! Recursive descent over a compiled [`Schema`] and an instance. The
//! evaluator is a pure function of its inputs: it borrows the schema
//! immutably and the instance read-only, so one schema can serve any number
//! of concurrent calls.
//!
//! All sibling checks at a level are collected. Once a value fails its own
//! `type` check, the keywords specific to that value's kind (object, array,
//! string and number keywords) are skipped; `enum`, `const` and composition
//! still run.

use serde_json::{Map, Number, Value};

use crate::node::{Additional, Items, Keywords, NodeBody, Schema, SchemaNode};
use crate::value;
use crate::violation::{InstancePath, Reason, ValidationResult, Violation};

/// Validate `instance` against `schema`, collecting every violation.
pub fn validate(schema: &Schema, instance: &Value) -> ValidationResult {
    let mut violations = Vec::new();
    Evaluator { schema }.node(schema.root(), instance, &InstancePath::root(), &mut violations);
    tracing::trace!(violations = violations.len(), "validated instance");
    ValidationResult::from_violations(violations)
}

impl Schema {
    /// Validate an instance against this schema.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        validate(self, instance)
    }

    /// Whether an instance is valid, without keeping the violations.
    pub fn is_valid(&self, instance: &Value) -> bool {
        validate(self, instance).is_valid()
    }
}

struct Evaluator<'s> {
    schema: &'s Schema,
}

impl<'s> Evaluator<'s> {
    fn node(&self, node: &SchemaNode, instance: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
        match node.body() {
            NodeBody::Accept => {}
            NodeBody::Reject => out.push(violation(
                path,
                node.location().to_string(),
                Reason::TypeMismatch,
                format!("{instance} is not allowed here"),
            )),
            NodeBody::Ref(reference) => {
                // Compilation guarantees every reference resolves.
                if let Some(target) = self.schema.resolve(reference) {
                    self.node(target, instance, path, out);
                }
            }
            NodeBody::Keywords(k) => self.keywords(node, k, instance, path, out),
        }
    }

    fn matches(&self, node: &SchemaNode, instance: &Value, path: &InstancePath) -> bool {
        let mut scratch = Vec::new();
        self.node(node, instance, path, &mut scratch);
        scratch.is_empty()
    }

    fn keywords(
        &self,
        node: &SchemaNode,
        k: &Keywords,
        instance: &Value,
        path: &InstancePath,
        out: &mut Vec<Violation>,
    ) {
        let at = |keyword: &str| format!("{}/{keyword}", node.location());

        let type_ok = match k.types {
            Some(types) if !types.admits(instance) => {
                out.push(violation(
                    path,
                    at("type"),
                    Reason::TypeMismatch,
                    format!("{instance} is not of type {types}"),
                ));
                false
            }
            _ => true,
        };

        if let Some(members) = &k.enumeration {
            if !members.iter().any(|m| value::json_equal(m, instance)) {
                let listed: Vec<String> = members.iter().map(Value::to_string).collect();
                out.push(violation(
                    path,
                    at("enum"),
                    Reason::EnumMismatch,
                    format!("{instance} is not one of [{}]", listed.join(", ")),
                ));
            }
        }
        if let Some(expected) = &k.constant {
            if !value::json_equal(expected, instance) {
                out.push(violation(
                    path,
                    at("const"),
                    Reason::EnumMismatch,
                    format!("{expected} was expected"),
                ));
            }
        }

        if type_ok {
            match instance {
                Value::Object(map) => self.object(node, k, map, path, out),
                Value::Array(items) => self.array(node, k, items, path, out),
                Value::String(s) => string(node, k, s, path, out),
                Value::Number(n) => number(node, k, n, path, out),
                Value::Bool(_) | Value::Null => {}
            }
        }

        self.composition(node, k, instance, path, out);
    }

    fn object(
        &self,
        node: &SchemaNode,
        k: &Keywords,
        map: &Map<String, Value>,
        path: &InstancePath,
        out: &mut Vec<Violation>,
    ) {
        let rules = &k.object;
        let at = |keyword: &str| format!("{}/{keyword}", node.location());

        for name in &rules.required {
            if !map.contains_key(name) {
                out.push(violation(
                    &path.child(name.as_str()),
                    at("required"),
                    Reason::MissingRequired,
                    format!("\"{name}\" is a required property"),
                ));
            }
        }

        for (name, sub) in &rules.properties {
            if let Some(member) = map.get(name) {
                self.node(sub, member, &path.child(name.as_str()), out);
            }
        }

        for (name, member) in map {
            if rules.property(name).is_some() {
                continue;
            }
            match &rules.additional {
                Additional::Allow => {}
                Additional::Forbid => out.push(violation(
                    &path.child(name.as_str()),
                    at("additionalProperties"),
                    Reason::UnknownAdditionalProperty,
                    format!("additional property \"{name}\" is not allowed"),
                )),
                Additional::Schema(sub) => self.node(sub, member, &path.child(name.as_str()), out),
            }
        }

        let count = map.len() as u64;
        if let Some(min) = rules.min_properties.filter(|min| count < *min) {
            out.push(violation(
                path,
                at("minProperties"),
                Reason::OutOfBounds,
                format!("object has {count} properties, fewer than the minimum of {min}"),
            ));
        }
        if let Some(max) = rules.max_properties.filter(|max| count > *max) {
            out.push(violation(
                path,
                at("maxProperties"),
                Reason::OutOfBounds,
                format!("object has {count} properties, more than the maximum of {max}"),
            ));
        }
    }

    fn array(
        &self,
        node: &SchemaNode,
        k: &Keywords,
        items: &[Value],
        path: &InstancePath,
        out: &mut Vec<Violation>,
    ) {
        let rules = &k.array;
        let at = |keyword: &str| format!("{}/{keyword}", node.location());

        match &rules.items {
            Some(Items::Each(sub)) => {
                for (index, item) in items.iter().enumerate() {
                    self.node(sub, item, &path.child(index), out);
                }
            }
            Some(Items::Tuple(positional)) => {
                for (index, item) in items.iter().enumerate() {
                    let item_path = path.child(index);
                    match (positional.get(index), &rules.additional_items) {
                        (Some(sub), _) => self.node(sub, item, &item_path, out),
                        (None, Additional::Allow) => {}
                        (None, Additional::Forbid) => out.push(violation(
                            &item_path,
                            at("additionalItems"),
                            Reason::OutOfBounds,
                            format!(
                                "array has {} items, but only {} are allowed",
                                items.len(),
                                positional.len()
                            ),
                        )),
                        (None, Additional::Schema(sub)) => self.node(sub, item, &item_path, out),
                    }
                }
            }
            None => {}
        }

        let count = items.len() as u64;
        if let Some(min) = rules.min_items.filter(|min| count < *min) {
            out.push(violation(
                path,
                at("minItems"),
                Reason::OutOfBounds,
                format!("array has {count} items, fewer than the minimum of {min}"),
            ));
        }
        if let Some(max) = rules.max_items.filter(|max| count > *max) {
            out.push(violation(
                path,
                at("maxItems"),
                Reason::OutOfBounds,
                format!("array has {count} items, more than the maximum of {max}"),
            ));
        }
    }

    fn composition(
        &self,
        node: &SchemaNode,
        k: &Keywords,
        instance: &Value,
        path: &InstancePath,
        out: &mut Vec<Violation>,
    ) {
        let composition = &k.composition;
        if composition.is_empty() {
            return;
        }
        let at = |keyword: &str| format!("{}/{keyword}", node.location());

        for branch in &composition.all_of {
            self.node(branch, instance, path, out);
        }

        if !composition.any_of.is_empty()
            && !composition.any_of.iter().any(|b| self.matches(b, instance, path))
        {
            out.push(violation(
                path,
                at("anyOf"),
                Reason::WrongArity,
                format!(
                    "{instance} does not match any of the {} alternatives",
                    composition.any_of.len()
                ),
            ));
        }

        if !composition.one_of.is_empty() {
            let matched = composition
                .one_of
                .iter()
                .filter(|b| self.matches(b, instance, path))
                .count();
            if matched != 1 {
                out.push(violation(
                    path,
                    at("oneOf"),
                    Reason::WrongArity,
                    format!(
                        "{instance} matches {matched} of the {} alternatives, expected exactly one",
                        composition.one_of.len()
                    ),
                ));
            }
        }

        if let Some(negated) = &composition.not {
            if self.matches(negated, instance, path) {
                out.push(violation(
                    path,
                    at("not"),
                    Reason::WrongArity,
                    format!("{instance} must not match the negated schema"),
                ));
            }
        }
    }
}

fn string(node: &SchemaNode, k: &Keywords, s: &str, path: &InstancePath, out: &mut Vec<Violation>) {
    let rules = &k.string;
    let at = |keyword: &str| format!("{}/{keyword}", node.location());

    let length = s.chars().count() as u64;
    if let Some(min) = rules.min_length.filter(|min| length < *min) {
        out.push(violation(
            path,
            at("minLength"),
            Reason::OutOfBounds,
            format!("\"{s}\" is shorter than {min} characters"),
        ));
    }
    if let Some(max) = rules.max_length.filter(|max| length > *max) {
        out.push(violation(
            path,
            at("maxLength"),
            Reason::OutOfBounds,
            format!("\"{s}\" is longer than {max} characters"),
        ));
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(s) {
            out.push(violation(
                path,
                at("pattern"),
                Reason::PatternMismatch,
                format!("\"{s}\" does not match \"{}\"", pattern.as_str()),
            ));
        }
    }
}

fn number(node: &SchemaNode, k: &Keywords, n: &Number, path: &InstancePath, out: &mut Vec<Violation>) {
    use std::cmp::Ordering::{Equal, Greater, Less};

    let rules = &k.number;
    let at = |keyword: &str| format!("{}/{keyword}", node.location());

    let checks = [
        ("minimum", &rules.minimum, &[Less][..], "less than the minimum of"),
        ("maximum", &rules.maximum, &[Greater][..], "greater than the maximum of"),
        (
            "exclusiveMinimum",
            &rules.exclusive_minimum,
            &[Less, Equal][..],
            "less than or equal to the exclusive minimum of",
        ),
        (
            "exclusiveMaximum",
            &rules.exclusive_maximum,
            &[Greater, Equal][..],
            "greater than or equal to the exclusive maximum of",
        ),
    ];
    for (keyword, bound, crossing, relation) in checks {
        let Some(bound) = bound else {
            continue;
        };
        let crossed = value::compare_numbers(n, bound).is_some_and(|ord| crossing.contains(&ord));
        if crossed {
            out.push(violation(
                path,
                at(keyword),
                Reason::OutOfBounds,
                format!("{n} is {relation} {bound}"),
            ));
        }
    }
}

fn violation(path: &InstancePath, schema_path: String, reason: Reason, message: String) -> Violation {
    Violation {
        instance_path: path.clone(),
        schema_path,
        reason,
        message,
    }
}
