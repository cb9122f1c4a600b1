//! # Schema and Validation Errors
//!
//! Two audiences, two types:
//!
//! - [`SchemaError`] means the validator itself cannot work: a schema
//!   document is malformed. It is a configuration defect and surfaces when
//!   the registry is built.
//! - [`ValidationError`] is the per-call outcome for one document: it did
//!   not load, or it loaded and does not conform.

use imgidx_core::LoadError;
use thiserror::Error;

use crate::evaluate::ValidationViolations;

/// A schema document is malformed.
///
/// `location` is `<document>#<json-pointer>` of the offending schema node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A schema document is not valid JSON.
    #[error("schema document {document:?} is not valid JSON: {reason}")]
    InvalidJson { document: String, reason: String },

    /// A reference or binding names a document that was never added.
    #[error("unknown schema document {0:?}")]
    UnknownDocument(String),

    /// A keyword holds a value of the wrong shape.
    #[error("{location}: invalid `{keyword}`: {reason}")]
    InvalidKeyword {
        location: String,
        keyword: String,
        reason: String,
    },

    /// A `type` keyword names no known kind.
    #[error("{location}: unknown type {name:?}")]
    UnknownType { location: String, name: String },

    /// A `pattern` keyword is not a valid regular expression.
    #[error("{location}: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        location: String,
        pattern: String,
        reason: String,
    },

    /// A `$ref` points at nothing.
    #[error("{location}: unresolved reference {reference:?}")]
    UnresolvedRef { location: String, reference: String },

    /// A `$ref` chain leads back to itself.
    #[error("{location}: cyclic reference {reference:?}")]
    CyclicRef { location: String, reference: String },

    /// No schema is bound to the requested media type.
    #[error("no schema registered for media type {0:?}")]
    UnregisteredMediaType(String),
}

/// A document failed to validate.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The bytes did not parse into a document tree.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The document parsed but does not conform to its schema.
    #[error("document does not conform to {media_type}:\n{violations}")]
    Invalid {
        media_type: String,
        violations: ValidationViolations,
    },

    /// The schema needed for this call is unavailable or malformed.
    #[error("schema configuration error: {0}")]
    Schema(#[from] SchemaError),
}

impl ValidationError {
    /// The violations, when the failure is a conformance failure.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::Invalid { violations, .. } => Some(violations),
            _ => None,
        }
    }
}
