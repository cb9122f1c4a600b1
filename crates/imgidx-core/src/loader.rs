//! # Document Loader
//!
//! Turns a byte stream into a [`Document`] tree. Only syntactic
//! well-formedness is checked here; conformance is the evaluator's job.
//!
//! ## Policies
//!
//! - Numbers are classified from their literal text (see [`Number`]).
//! - Duplicate object keys: the last occurrence wins and keeps the position
//!   of the first.
//! - Streams are read to completion before parsing; trailing non-whitespace
//!   is a syntax error.
//! - Nesting deeper than [`LoaderOptions::max_depth`] is rejected.

use std::io::Read;

use serde_json::Value;

use crate::document::{Document, Number, Object};
use crate::error::LoadError;
use crate::options::LoaderOptions;

const RECURSION_LIMIT_MESSAGE: &str = "recursion limit exceeded";

/// A document loader with fixed options. Cheap to copy and safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    options: LoaderOptions,
}

impl Loader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Parse a complete document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Syntax`] with line and column if the bytes are
    /// not well-formed JSON, [`LoadError::TooDeep`] if nesting exceeds the
    /// configured limit.
    pub fn load_slice(&self, bytes: &[u8]) -> Result<Document, LoadError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| self.parse_error(e))?;
        let document = convert(value, 1, self.options.max_depth)?;
        tracing::trace!(bytes = bytes.len(), kind = %document.kind(), "loaded document");
        Ok(document)
    }

    /// Read `reader` to the end, then parse it.
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<Document, LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_slice(&buf)
    }

    pub fn load_str(&self, text: &str) -> Result<Document, LoadError> {
        self.load_slice(text.as_bytes())
    }

    /// The parser's own nesting guard fires before ours can; report it as
    /// the depth limit it is.
    fn parse_error(&self, e: serde_json::Error) -> LoadError {
        if e.is_syntax() && e.to_string().starts_with(RECURSION_LIMIT_MESSAGE) {
            LoadError::TooDeep {
                limit: self.options.max_depth,
            }
        } else {
            e.into()
        }
    }
}

/// Parse bytes with default options.
pub fn load_slice(bytes: &[u8]) -> Result<Document, LoadError> {
    Loader::default().load_slice(bytes)
}

/// Read and parse a stream with default options.
pub fn load_reader<R: Read>(reader: R) -> Result<Document, LoadError> {
    Loader::default().load_reader(reader)
}

/// Parse text with default options.
pub fn load_str(text: &str) -> Result<Document, LoadError> {
    Loader::default().load_str(text)
}

/// Convert a parsed value, counting container depth from 1 at the root.
fn convert(value: Value, depth: usize, limit: usize) -> Result<Document, LoadError> {
    match value {
        Value::Null => Ok(Document::Null),
        Value::Bool(b) => Ok(Document::Bool(b)),
        Value::Number(n) => Ok(Document::Number(Number::from_json(&n))),
        Value::String(s) => Ok(Document::String(s)),
        Value::Array(items) => {
            check_depth(depth, limit)?;
            items
                .into_iter()
                .map(|item| convert(item, depth + 1, limit))
                .collect::<Result<Vec<_>, _>>()
                .map(Document::Array)
        }
        Value::Object(map) => {
            check_depth(depth, limit)?;
            // serde_json's map already applied last-wins on duplicate keys.
            let mut object = Object::with_capacity(map.len());
            for (key, item) in map {
                object.push_unique(key, convert(item, depth + 1, limit)?);
            }
            Ok(Document::Object(object))
        }
    }
}

fn check_depth(depth: usize, limit: usize) -> Result<(), LoadError> {
    if depth > limit {
        Err(LoadError::TooDeep { limit })
    } else {
        Ok(())
    }
}
