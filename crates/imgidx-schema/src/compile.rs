//! # Schema Compilation
//!
//! Turns JSON schema documents (the draft-04 subset the image schemas use)
//! into owned [`SchemaNode`] trees.
//!
//! ## Supported Keywords
//!
//! `type`, `required`, `properties`, `additionalProperties` (schema or
//! `true`), `items` (single schema), `pattern`, `enum`, `minimum`,
//! `maximum`, `minLength`, `maxLength`, `minItems`, `maxItems`, `$ref`.
//! Annotation keywords (`description`, `id`, `$schema`, `definitions`, ...)
//! are ignored.
//!
//! ## Reference Resolution
//!
//! `$ref` takes the form `#/json/pointer` (same document) or
//! `other.json#/json/pointer` (another added document). Targets are
//! compiled in place, so the result is a plain tree. As in draft-04,
//! keywords beside a `$ref` are ignored. A reference chain that revisits
//! itself is a [`SchemaError::CyclicRef`].

use std::collections::HashMap;

use imgidx_core::{Document, Kind, Number};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::node::{Pattern, SchemaNode, TypeSet};

/// Document name used by [`compile_value`].
const INLINE_DOCUMENT: &str = "<inline>";

/// A set of named schema documents that may reference each other.
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    documents: HashMap<String, Value>,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add a schema document under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidJson`] if `text` is not JSON.
    pub fn add_document(&mut self, name: impl Into<String>, text: &str) -> Result<&mut Self, SchemaError> {
        let name = name.into();
        let value: Value = serde_json::from_str(text).map_err(|e| SchemaError::InvalidJson {
            document: name.clone(),
            reason: e.to_string(),
        })?;
        self.documents.insert(name, value);
        Ok(self)
    }

    /// Add an already parsed schema document under `name`.
    pub fn add_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.documents.insert(name.into(), value);
        self
    }

    /// Compile the root schema of document `name`.
    pub fn compile(&self, name: &str) -> Result<SchemaNode, SchemaError> {
        let root = self
            .documents
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDocument(name.to_string()))?;
        let mut refs = Vec::new();
        let node = self.node(&Cursor::root(name), root, &mut refs)?;
        tracing::debug!(document = name, "compiled schema document");
        Ok(node)
    }

    fn node(&self, at: &Cursor, value: &Value, refs: &mut Vec<String>) -> Result<SchemaNode, SchemaError> {
        let map = match value {
            Value::Bool(true) => return Ok(SchemaNode::any()),
            Value::Object(map) => map,
            other => {
                return Err(at.invalid("schema", format!("expected an object, got {}", json_kind(other))))
            }
        };

        if let Some(reference) = map.get("$ref") {
            return self.reference(at, reference, refs);
        }

        let mut node = SchemaNode::any();
        for (keyword, v) in map {
            match keyword.as_str() {
                "type" => node.types = Some(parse_types(at, v)?),
                "required" => node.required = string_list(at, keyword, v)?,
                "properties" => node.properties = self.properties(at, v, refs)?,
                "additionalProperties" => {
                    node.additional_properties = match v {
                        Value::Bool(true) => None,
                        Value::Bool(false) => {
                            return Err(at.invalid(keyword, "closed objects are not supported"))
                        }
                        _ => Some(Box::new(self.node(&at.child(keyword), v, refs)?)),
                    }
                }
                "items" => {
                    if v.is_array() {
                        return Err(at.invalid(keyword, "tuple-form items are not supported"));
                    }
                    node.items = Some(Box::new(self.node(&at.child(keyword), v, refs)?));
                }
                "pattern" => {
                    let source = v
                        .as_str()
                        .ok_or_else(|| at.invalid(keyword, "expected a string"))?;
                    let pattern = Pattern::new(source).map_err(|e| SchemaError::InvalidPattern {
                        location: at.location(),
                        pattern: source.to_string(),
                        reason: e.to_string(),
                    })?;
                    node.pattern = Some(pattern);
                }
                "enum" => {
                    let members = v
                        .as_array()
                        .filter(|a| !a.is_empty())
                        .ok_or_else(|| at.invalid(keyword, "expected a non-empty array"))?;
                    node.enumeration = Some(members.iter().map(Document::from).collect());
                }
                "minimum" => node.minimum = Some(number(at, keyword, v)?),
                "maximum" => node.maximum = Some(number(at, keyword, v)?),
                "minLength" => node.min_length = Some(count(at, keyword, v)?),
                "maxLength" => node.max_length = Some(count(at, keyword, v)?),
                "minItems" => node.min_items = Some(count(at, keyword, v)?),
                "maxItems" => node.max_items = Some(count(at, keyword, v)?),
                _ => {}
            }
        }
        Ok(node)
    }

    fn properties(
        &self,
        at: &Cursor,
        value: &Value,
        refs: &mut Vec<String>,
    ) -> Result<Vec<(String, SchemaNode)>, SchemaError> {
        let map: &Map<String, Value> = value
            .as_object()
            .ok_or_else(|| at.invalid("properties", "expected an object"))?;
        let base = at.child("properties");
        let mut properties = Vec::with_capacity(map.len());
        for (name, sub) in map {
            properties.push((name.clone(), self.node(&base.child(name), sub, refs)?));
        }
        Ok(properties)
    }

    fn reference(&self, at: &Cursor, value: &Value, refs: &mut Vec<String>) -> Result<SchemaNode, SchemaError> {
        let reference = value
            .as_str()
            .ok_or_else(|| at.invalid("$ref", "expected a string"))?;
        let (document, fragment) = match reference.split_once('#') {
            Some((document, fragment)) => (document, fragment),
            None => (reference, ""),
        };
        let document = if document.is_empty() {
            at.document.as_str()
        } else {
            document
        };

        let unresolved = || SchemaError::UnresolvedRef {
            location: at.location(),
            reference: reference.to_string(),
        };
        let target = self
            .documents
            .get(document)
            .and_then(|root| root.pointer(fragment))
            .ok_or_else(unresolved)?;

        let key = format!("{document}#{fragment}");
        if refs.contains(&key) {
            return Err(SchemaError::CyclicRef {
                location: at.location(),
                reference: reference.to_string(),
            });
        }
        refs.push(key);
        let target_cursor = Cursor {
            document: document.to_string(),
            pointer: fragment.to_string(),
        };
        let node = self.node(&target_cursor, target, refs);
        refs.pop();
        node
    }
}

/// Compile a single self-contained schema value.
pub fn compile_value(value: &Value) -> Result<SchemaNode, SchemaError> {
    let mut compiler = SchemaCompiler::new();
    compiler.add_value(INLINE_DOCUMENT, value.clone());
    compiler.compile(INLINE_DOCUMENT)
}

/// Position of a schema node, for error messages and reference resolution.
struct Cursor {
    document: String,
    pointer: String,
}

impl Cursor {
    fn root(document: &str) -> Self {
        Self {
            document: document.to_string(),
            pointer: String::new(),
        }
    }

    fn child(&self, segment: &str) -> Self {
        let escaped = segment.replace('~', "~0").replace('/', "~1");
        Self {
            document: self.document.clone(),
            pointer: format!("{}/{escaped}", self.pointer),
        }
    }

    fn location(&self) -> String {
        format!("{}#{}", self.document, self.pointer)
    }

    fn invalid(&self, keyword: &str, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidKeyword {
            location: self.location(),
            keyword: keyword.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_types(at: &Cursor, value: &Value) -> Result<TypeSet, SchemaError> {
    let names: Vec<&str> = match value {
        Value::String(name) => vec![name.as_str()],
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| at.invalid("type", "expected type names"))
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(at.invalid("type", "expected a type name or a non-empty array of them")),
    };
    let kinds = names
        .into_iter()
        .map(|name| {
            Kind::from_name(name).ok_or_else(|| SchemaError::UnknownType {
                location: at.location(),
                name: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TypeSet::new(kinds))
}

fn string_list(at: &Cursor, keyword: &str, value: &Value) -> Result<Vec<String>, SchemaError> {
    value
        .as_array()
        .ok_or_else(|| at.invalid(keyword, "expected an array of strings"))?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| at.invalid(keyword, "expected an array of strings"))
        })
        .collect()
}

fn number(at: &Cursor, keyword: &str, value: &Value) -> Result<Number, SchemaError> {
    match value {
        Value::Number(n) => Ok(Number::from_json(n)),
        _ => Err(at.invalid(keyword, "expected a number")),
    }
}

fn count(at: &Cursor, keyword: &str, value: &Value) -> Result<usize, SchemaError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| at.invalid(keyword, "expected a non-negative integer"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_basic_keywords() {
        let node = compile_value(&json!({
            "type": "object",
            "required": ["size"],
            "properties": {
                "size": {"type": "integer", "minimum": 0},
                "tags": {"type": "array", "items": {"type": "string"}, "minItems": 1}
            }
        }))
        .unwrap();
        assert_eq!(node.types, Some(TypeSet::single(Kind::Object)));
        assert_eq!(node.required, vec!["size"]);
        let size = node.property("size").unwrap();
        assert_eq!(size.minimum, Some(Number::from_literal("0")));
        let tags = node.property("tags").unwrap();
        assert_eq!(tags.min_items, Some(1));
        assert_eq!(tags.items.as_deref(), Some(&SchemaNode::of_kind(Kind::String)));
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let node = compile_value(&json!({
            "properties": {"z": true, "a": true, "m": true}
        }))
        .unwrap();
        let names: Vec<&str> = node.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_annotation_keywords_ignored() {
        let node = compile_value(&json!({
            "description": "x",
            "id": "https://example.com/x",
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "string"
        }))
        .unwrap();
        assert_eq!(node, SchemaNode::of_kind(Kind::String));
    }

    #[test]
    fn test_local_ref_resolved() {
        let node = compile_value(&json!({
            "definitions": {"digest": {"type": "string", "pattern": "[a-z0-9]+:[a-f0-9]+"}},
            "properties": {"digest": {"$ref": "#/definitions/digest", "type": "integer"}}
        }))
        .unwrap();
        let digest = node.property("digest").unwrap();
        assert_eq!(digest.types, Some(TypeSet::single(Kind::String)));
        assert!(digest.pattern.as_ref().unwrap().is_match("sha256:abc"));
    }

    #[test]
    fn test_cross_document_ref_resolved() {
        let mut compiler = SchemaCompiler::new();
        compiler
            .add_document("defs.json", r#"{"definitions": {"uint64": {"type": "integer", "minimum": 0}}}"#)
            .unwrap()
            .add_document("root.json", r#"{"properties": {"size": {"$ref": "defs.json#/definitions/uint64"}}}"#)
            .unwrap();
        let node = compiler.compile("root.json").unwrap();
        assert_eq!(
            node.property("size").unwrap().minimum,
            Some(Number::from_literal("0"))
        );
    }

    #[test]
    fn test_chained_refs_resolved_in_target_document() {
        let mut compiler = SchemaCompiler::new();
        compiler
            .add_document(
                "defs.json",
                r##"{"definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"type": "null"}}}"##,
            )
            .unwrap()
            .add_document("root.json", r#"{"$ref": "defs.json#/definitions/a"}"#)
            .unwrap();
        assert_eq!(compiler.compile("root.json").unwrap(), SchemaNode::of_kind(Kind::Null));
    }

    #[test]
    fn test_unresolved_ref() {
        let err = compile_value(&json!({"$ref": "#/definitions/missing"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedRef { .. }));
        let err = compile_value(&json!({"$ref": "nowhere.json#/x"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedRef { .. }));
    }

    #[test]
    fn test_cyclic_ref_rejected() {
        let err = compile_value(&json!({
            "definitions": {"node": {"properties": {"child": {"$ref": "#/definitions/node"}}}},
            "$ref": "#/definitions/node"
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::CyclicRef { .. }), "got {err}");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = compile_value(&json!({"properties": {"a": {"type": "int"}}})).unwrap_err();
        match err {
            SchemaError::UnknownType { location, name } => {
                assert_eq!(location, "<inline>#/properties/a");
                assert_eq!(name, "int");
            }
            other => panic!("expected UnknownType, got {other}"),
        }
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = compile_value(&json!({"pattern": "(unclosed"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_malformed_keywords_rejected() {
        for schema in [
            json!({"required": "size"}),
            json!({"enum": []}),
            json!({"minimum": "0"}),
            json!({"minItems": -1}),
            json!({"items": [{"type": "string"}]}),
            json!({"additionalProperties": false}),
            json!({"type": []}),
            json!(42),
        ] {
            let err = compile_value(&schema).unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidKeyword { .. }),
                "{schema} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn test_pointer_escaping_in_locations() {
        let err = compile_value(&json!({"properties": {"a/b": {"type": "bogus"}}})).unwrap_err();
        assert!(err.to_string().contains("#/properties/a~1b"));
    }

    #[test]
    fn test_unknown_document() {
        let err = SchemaCompiler::new().compile("missing.json").unwrap_err();
        assert_eq!(err, SchemaError::UnknownDocument("missing.json".to_string()));
    }

    #[test]
    fn test_invalid_json_document() {
        let err = SchemaCompiler::new().add_document("bad.json", "{").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson { .. }));
    }
}
