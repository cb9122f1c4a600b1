//! # Document Tree
//!
//! The generic in-memory form of a parsed JSON document: scalars, ordered
//! arrays, and string-keyed objects.
//!
//! ## Syntactic Number Typing
//!
//! JSON has a single number type, but schemas distinguish `integer` from
//! `number`. The distinction is taken from the source text: a literal with
//! no fraction and no exponent is an integer, anything else is fractional.
//! The literal is kept verbatim, so integers wider than 64 bits are still
//! classified and compared exactly.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The runtime kind of a document node, as named in schema `type` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 7] = [
        Kind::Null,
        Kind::Boolean,
        Kind::Integer,
        Kind::Number,
        Kind::String,
        Kind::Array,
        Kind::Object,
    ];

    /// Returns the schema keyword spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Parse a schema `type` name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a numeric literal was written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    /// No fraction, no exponent: `42`, `-7`.
    Integer,
    /// Fraction or exponent present: `7143.0`, `1e3`.
    Fractional,
}

/// A numeric scalar carrying its original literal.
///
/// Equality and ordering are by value (`2 == 2.0`); the syntactic
/// [`NumberKind`] is only consulted for type classification.
#[derive(Debug, Clone)]
pub struct Number {
    literal: String,
    kind: NumberKind,
}

impl Number {
    /// Build a number from a JSON numeric literal.
    ///
    /// The caller guarantees `literal` is valid JSON number syntax; the
    /// loader and schema compiler only ever pass literals produced by
    /// `serde_json`.
    pub fn from_literal(literal: impl Into<String>) -> Self {
        let literal = literal.into();
        let kind = if literal.contains(['.', 'e', 'E']) {
            NumberKind::Fractional
        } else {
            NumberKind::Integer
        };
        Self { literal, kind }
    }

    /// Build a number from a `serde_json` number, preserving its literal.
    pub fn from_json(n: &serde_json::Number) -> Self {
        Self::from_literal(n.to_string())
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn is_integer(&self) -> bool {
        self.kind == NumberKind::Integer
    }

    /// The literal exactly as written in the source.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Lossy floating-point value. Out-of-range literals become infinite.
    pub fn as_f64(&self) -> f64 {
        self.literal.parse::<f64>().unwrap_or(f64::NAN)
    }

    /// Exact value for integer literals that fit in 128 bits.
    pub fn as_i128(&self) -> Option<i128> {
        if self.is_integer() {
            self.literal.parse::<i128>().ok()
        } else {
            None
        }
    }

    /// Compare by value. Two integer literals compare exactly, anything
    /// else falls back to `f64`.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            return Some(a.cmp(&b));
        }
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// A JSON object: unique string keys in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: Vec<(String, Document)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a property. An existing key keeps its position and takes the
    /// new value (last occurrence wins); the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> Option<Document> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append a key known to be absent. The loader's input map has already
    /// collapsed duplicates, so no scan is needed.
    pub(crate) fn push_unique(&mut self, key: String, value: Document) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Object {
    /// Key order is not significant.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Into<String>> FromIterator<(K, Document)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Document)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Document>),
    Object(Object),
}

impl Document {
    /// The runtime kind of this node. Fractional literals are
    /// [`Kind::Number`], integer literals [`Kind::Integer`].
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Boolean,
            Self::Number(n) if n.is_integer() => Kind::Integer,
            Self::Number(_) => Kind::Number,
            Self::String(_) => Kind::String,
            Self::Array(_) => Kind::Array,
            Self::Object(_) => Kind::Object,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Look up a property when this node is an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|o| o.get(key))
    }
}

impl From<&serde_json::Value> for Document {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(Number::from_json(n)),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Document {
    /// Compact JSON rendering, used in violation messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write_json_string(f, s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(object) => {
                f.write_str("{")?;
                for (i, (k, v)) in object.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_json_string(f, k)?;
                    write!(f, ":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_json_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}
