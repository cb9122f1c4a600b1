//! # Schema Evaluator
//!
//! Recursive descent over a [`SchemaNode`] tree, checking a borrowed
//! [`Document`] and collecting every violation it can locate.
//!
//! ## Policies
//!
//! - **Schema-driven.** Object checks iterate `required` and `properties`
//!   of the schema. Document keys are only visited to feed
//!   `additional_properties` when a schema declares it; an undeclared
//!   property never fails on its own.
//! - **Type first.** A node whose kind is not admitted gets one
//!   `TypeMismatch` and nothing below it is examined.
//! - **No sibling short-circuit.** Every missing required property, every
//!   declared property and every array element is evaluated.
//!
//! Order of reported violations: for an object, missing required properties
//! in schema order, then declared properties in schema order, then
//! additional properties in document order. Array elements by index.

use std::cmp::Ordering;
use std::fmt;

use imgidx_core::{Document, DocumentPath, Number, Object, PathSegment};
use serde::Serialize;

use crate::node::SchemaNode;

/// What kind of constraint a document broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    TypeMismatch,
    MissingRequiredProperty,
    PatternMismatch,
    EnumMismatch,
    RangeViolation,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type mismatch",
            Self::MissingRequiredProperty => "missing required property",
            Self::PatternMismatch => "pattern mismatch",
            Self::EnumMismatch => "enum mismatch",
            Self::RangeViolation => "range violation",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single located failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path of the offending node. For a missing property, the object
    /// that lacks it.
    pub path: DocumentPath,
    pub kind: ViolationKind,
    /// Human-readable reason, without the path.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Non-empty, ordered collection of violations from one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false for values returned by [`validate`].
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// The first violation in report order.
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Violations reported at exactly `path` (rendered form, e.g. `manifests.0`).
    pub fn at(&self, path: &str) -> impl Iterator<Item = &Violation> + '_ {
        let path = path.to_string();
        self.violations
            .iter()
            .filter(move |v| v.path.to_string() == path)
    }

    /// Whether a violation of `kind` was reported at `path`.
    pub fn contains(&self, path: &str, kind: ViolationKind) -> bool {
        self.at(path).any(|v| v.kind == kind)
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Check `document` against `schema`.
///
/// Never panics on any document. Returns every violation found, in report
/// order; see the module docs for what is and is not examined.
pub fn validate(document: &Document, schema: &SchemaNode) -> Result<(), ValidationViolations> {
    let mut evaluator = Evaluator::default();
    evaluator.node(document, schema);
    if evaluator.violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationViolations {
            violations: evaluator.violations,
        })
    }
}

#[derive(Default)]
struct Evaluator {
    path: DocumentPath,
    violations: Vec<Violation>,
}

impl Evaluator {
    fn report(&mut self, kind: ViolationKind, message: String) {
        self.violations.push(Violation {
            path: self.path.clone(),
            kind,
            message,
        });
    }

    fn node(&mut self, document: &Document, schema: &SchemaNode) {
        let kind = document.kind();
        if let Some(types) = &schema.types {
            if !types.accepts(kind) {
                self.report(
                    ViolationKind::TypeMismatch,
                    format!("expected {types}, got {kind}"),
                );
                return;
            }
        }

        match document {
            Document::Object(object) => self.object(object, schema),
            Document::Array(items) => self.array(items, schema),
            Document::String(value) => self.string(value, schema),
            Document::Number(value) => self.number(value, schema),
            Document::Null | Document::Bool(_) => {}
        }

        if let Some(allowed) = &schema.enumeration {
            if !allowed.contains(document) {
                let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                self.report(
                    ViolationKind::EnumMismatch,
                    format!("{document} is not one of [{}]", listed.join(", ")),
                );
            }
        }
    }

    fn object(&mut self, object: &Object, schema: &SchemaNode) {
        for name in &schema.required {
            if !object.contains_key(name) {
                self.report(
                    ViolationKind::MissingRequiredProperty,
                    format!("missing required property {name:?}"),
                );
            }
        }

        for (name, sub) in &schema.properties {
            if let Some(value) = object.get(name) {
                self.descend(name.as_str(), value, sub);
            }
        }

        if let Some(extra) = &schema.additional_properties {
            for (name, value) in object.iter() {
                if !schema.declares(name) {
                    self.descend(name, value, extra);
                }
            }
        }
    }

    fn array(&mut self, items: &[Document], schema: &SchemaNode) {
        self.check_count("item", items.len(), schema.min_items, schema.max_items);

        if let Some(item_schema) = &schema.items {
            for (index, item) in items.iter().enumerate() {
                self.descend(index, item, item_schema);
            }
        }
    }

    fn string(&mut self, value: &str, schema: &SchemaNode) {
        if schema.min_length.is_some() || schema.max_length.is_some() {
            let length = value.chars().count();
            self.check_count("character", length, schema.min_length, schema.max_length);
        }

        if let Some(pattern) = &schema.pattern {
            if !pattern.is_match(value) {
                self.report(
                    ViolationKind::PatternMismatch,
                    format!("{value:?} does not match pattern {:?}", pattern.as_str()),
                );
            }
        }
    }

    fn number(&mut self, value: &Number, schema: &SchemaNode) {
        if let Some(minimum) = &schema.minimum {
            if !matches!(value.compare(minimum), Some(Ordering::Greater | Ordering::Equal)) {
                self.report(
                    ViolationKind::RangeViolation,
                    format!("{value} is less than the minimum of {minimum}"),
                );
            }
        }
        if let Some(maximum) = &schema.maximum {
            if !matches!(value.compare(maximum), Some(Ordering::Less | Ordering::Equal)) {
                self.report(
                    ViolationKind::RangeViolation,
                    format!("{value} is greater than the maximum of {maximum}"),
                );
            }
        }
    }

    fn check_count(&mut self, unit: &str, count: usize, min: Option<usize>, max: Option<usize>) {
        if let Some(min) = min {
            if count < min {
                self.report(
                    ViolationKind::RangeViolation,
                    format!("has {count} {unit}(s), fewer than the minimum of {min}"),
                );
            }
        }
        if let Some(max) = max {
            if count > max {
                self.report(
                    ViolationKind::RangeViolation,
                    format!("has {count} {unit}(s), more than the maximum of {max}"),
                );
            }
        }
    }

    fn descend(
        &mut self,
        segment: impl Into<PathSegment>,
        document: &Document,
        schema: &SchemaNode,
    ) {
        self.path.push(segment);
        self.node(document, schema);
        self.path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Pattern, TypeSet};
    use imgidx_core::{load_str, Kind};

    fn object_schema(required: &[&str], properties: Vec<(&str, SchemaNode)>) -> SchemaNode {
        SchemaNode {
            types: Some(TypeSet::single(Kind::Object)),
            required: required.iter().map(|s| s.to_string()).collect(),
            properties: properties
                .into_iter()
                .map(|(n, s)| (n.to_string(), s))
                .collect(),
            ..SchemaNode::any()
        }
    }

    #[test]
    fn test_type_mismatch_message() {
        let schema = object_schema(&[], vec![("size", SchemaNode::of_kind(Kind::Integer))]);
        let doc = load_str(r#"{"size": "7682"}"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.violations()[0].to_string(), "size: expected integer, got string");
    }

    #[test]
    fn test_fractional_whole_number_is_not_integer() {
        let schema = SchemaNode::of_kind(Kind::Integer);
        let doc = load_str("7143.0").unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::TypeMismatch);
        assert_eq!(err.violations()[0].message, "expected integer, got number");
    }

    #[test]
    fn test_type_mismatch_stops_descent() {
        let mut schema = object_schema(&["a"], vec![]);
        schema.pattern = Some(Pattern::new("x").unwrap());
        let doc = load_str(r#""not an object""#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.violations()[0].to_string(), "(root): expected object, got string");
    }

    #[test]
    fn test_all_missing_required_reported() {
        let schema = object_schema(&["mediaType", "size", "digest"], vec![]);
        let doc = load_str(r#"{"size": 1}"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        let kinds: Vec<_> = err.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::MissingRequiredProperty, ViolationKind::MissingRequiredProperty]
        );
        assert!(err.violations()[0].message.contains("\"mediaType\""));
        assert!(err.violations()[1].message.contains("\"digest\""));
    }

    #[test]
    fn test_missing_and_invalid_are_independent() {
        let schema = object_schema(
            &["size", "digest"],
            vec![("size", SchemaNode::of_kind(Kind::Integer))],
        );
        let doc = load_str(r#"{"size": true}"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        assert!(err.contains("", ViolationKind::MissingRequiredProperty));
        assert!(err.contains("size", ViolationKind::TypeMismatch));
    }

    #[test]
    fn test_undeclared_properties_ignored() {
        let schema = object_schema(&[], vec![("a", SchemaNode::of_kind(Kind::String))]);
        let doc = load_str(r#"{"a": "x", "b": 1, "c": {"deep": []}}"#).unwrap();
        assert!(validate(&doc, &schema).is_ok());
    }

    #[test]
    fn test_additional_properties_checked_when_declared() {
        let mut schema = SchemaNode::of_kind(Kind::Object);
        schema.additional_properties = Some(Box::new(SchemaNode::of_kind(Kind::String)));
        let doc = load_str(r#"{"k1": "v1", "k2": 2}"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.violations()[0].to_string(), "k2: expected string, got integer");
    }

    #[test]
    fn test_array_items_extend_path_with_index() {
        let mut schema = SchemaNode::of_kind(Kind::Array);
        schema.items = Some(Box::new(SchemaNode::of_kind(Kind::String)));
        let doc = load_str(r#"["a", 1, "c", null]"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        let paths: Vec<String> = err.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["1", "3"]);
    }

    #[test]
    fn test_pattern_rejects_empty_string() {
        let mut schema = SchemaNode::of_kind(Kind::String);
        schema.pattern = Some(Pattern::new("[a-z]+/[a-z]+").unwrap());
        let err = validate(&Document::String(String::new()), &schema).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::PatternMismatch);
    }

    #[test]
    fn test_enum_mismatch() {
        let schema = SchemaNode {
            enumeration: Some(vec![Document::String("1.0.0".into())]),
            ..SchemaNode::any()
        };
        assert!(validate(&Document::String("1.0.0".into()), &schema).is_ok());
        let err = validate(&Document::String("2.0.0".into()), &schema).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::EnumMismatch);
        assert_eq!(err.violations()[0].message, r#""2.0.0" is not one of ["1.0.0"]"#);
    }

    #[test]
    fn test_numeric_bounds() {
        let schema = SchemaNode {
            types: Some(TypeSet::single(Kind::Integer)),
            minimum: Some(Number::from_literal("2")),
            maximum: Some(Number::from_literal("2")),
            ..SchemaNode::any()
        };
        assert!(validate(&load_str("2").unwrap(), &schema).is_ok());
        let low = validate(&load_str("1").unwrap(), &schema).unwrap_err();
        assert_eq!(low.violations()[0].kind, ViolationKind::RangeViolation);
        assert!(low.violations()[0].message.contains("minimum"));
        let high = validate(&load_str("3").unwrap(), &schema).unwrap_err();
        assert!(high.violations()[0].message.contains("maximum"));
    }

    #[test]
    fn test_length_and_item_bounds() {
        let schema = SchemaNode {
            min_items: Some(1),
            items: Some(Box::new(SchemaNode {
                min_length: Some(2),
                max_length: Some(3),
                ..SchemaNode::of_kind(Kind::String)
            })),
            ..SchemaNode::of_kind(Kind::Array)
        };
        let empty = validate(&load_str("[]").unwrap(), &schema).unwrap_err();
        assert!(empty.contains("", ViolationKind::RangeViolation));
        let err = validate(&load_str(r#"["a", "ab", "abcd"]"#).unwrap(), &schema).unwrap_err();
        assert!(err.contains("0", ViolationKind::RangeViolation));
        assert!(err.contains("2", ViolationKind::RangeViolation));
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_sibling_branches_all_reported() {
        let manifest = object_schema(
            &["digest"],
            vec![("size", SchemaNode::of_kind(Kind::Integer))],
        );
        let schema = object_schema(
            &[],
            vec![(
                "manifests",
                SchemaNode {
                    items: Some(Box::new(manifest)),
                    ..SchemaNode::of_kind(Kind::Array)
                },
            )],
        );
        let doc = load_str(r#"{"manifests": [{"size": "1"}, {"digest": "d"}, {"size": 1.5}]}"#).unwrap();
        let err = validate(&doc, &schema).unwrap_err();
        let rendered: Vec<String> = err.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                r#"manifests.0: missing required property "digest""#,
                "manifests.0.size: expected integer, got string",
                r#"manifests.2: missing required property "digest""#,
                "manifests.2.size: expected integer, got number",
            ]
        );
    }

    #[test]
    fn test_violations_display_is_indented_lines() {
        let schema = object_schema(&["a", "b"], vec![]);
        let err = validate(&load_str("{}").unwrap(), &schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "  (root): missing required property \"a\"\n  (root): missing required property \"b\""
        );
    }
}
