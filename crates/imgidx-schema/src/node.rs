//! # Schema Nodes
//!
//! A [`SchemaNode`] is the compiled, owned form of one schema object. Every
//! constraint keyword is a field; an absent field imposes nothing. Nodes
//! form a tree: references are inlined at compile time, so evaluation never
//! looks anything up.

use std::fmt;

use imgidx_core::{Document, Kind, Number};
use regex::Regex;

/// The set of kinds a `type` keyword admits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<Kind>);

impl TypeSet {
    /// Build from kinds; duplicates are dropped and order normalized.
    pub fn new(kinds: impl IntoIterator<Item = Kind>) -> Self {
        let mut kinds: Vec<Kind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self(kinds)
    }

    pub fn single(kind: Kind) -> Self {
        Self(vec![kind])
    }

    pub fn kinds(&self) -> &[Kind] {
        &self.0
    }

    /// Whether a node of `kind` satisfies this set. Integers are numbers,
    /// the converse does not hold.
    pub fn accepts(&self, kind: Kind) -> bool {
        self.0.contains(&kind) || (kind == Kind::Integer && self.0.contains(&Kind::Number))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [only] => write!(f, "{only}"),
            kinds => {
                f.write_str("one of [")?;
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A compiled regular expression that must match a whole string.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`, anchored at both ends.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Declarative constraints for one shape of document value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Admissible kinds. `None` admits every kind.
    pub types: Option<TypeSet>,
    /// Property names an object must carry.
    pub required: Vec<String>,
    /// Sub-schemas for named properties, in declaration order.
    pub properties: Vec<(String, SchemaNode)>,
    /// Sub-schema for object properties not named in `properties`.
    /// `None` leaves them unchecked.
    pub additional_properties: Option<Box<SchemaNode>>,
    /// Sub-schema for every array element.
    pub items: Option<Box<SchemaNode>>,
    pub pattern: Option<Pattern>,
    /// Closed set of admissible values.
    pub enumeration: Option<Vec<Document>>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    /// String length bounds, in characters.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl SchemaNode {
    /// A node admitting anything.
    pub fn any() -> Self {
        Self::default()
    }

    /// A node admitting exactly one kind.
    pub fn of_kind(kind: Kind) -> Self {
        Self {
            types: Some(TypeSet::single(kind)),
            ..Self::default()
        }
    }

    /// The sub-schema declared for `name`, if any.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}
