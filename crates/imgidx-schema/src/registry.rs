//! # Schema Registry
//!
//! Maps media type identifiers to compiled [`SchemaNode`]s and runs the
//! load-then-evaluate pipeline for one document.
//!
//! ## Built-in Schemas
//!
//! The image schema documents are embedded at compile time from
//! `schemas/`. [`SchemaRegistry::builtin`] compiles them once per process;
//! afterwards the registry is read-only and shared across threads without
//! locking.
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` is `Send + Sync`. Validation borrows it immutably.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::OnceLock;

use imgidx_core::{Document, Loader, MediaType};

use crate::compile::SchemaCompiler;
use crate::error::{SchemaError, ValidationError};
use crate::evaluate;
use crate::node::SchemaNode;

/// Embedded schema documents, by the name `$ref`s use for them.
pub const BUILTIN_DOCUMENTS: [(&str, &str); 6] = [
    ("defs.json", include_str!("../schemas/defs.json")),
    ("defs-descriptor.json", include_str!("../schemas/defs-descriptor.json")),
    ("content-descriptor.json", include_str!("../schemas/content-descriptor.json")),
    ("image-manifest-schema.json", include_str!("../schemas/image-manifest-schema.json")),
    ("manifest-list-schema.json", include_str!("../schemas/manifest-list-schema.json")),
    ("image-layout-schema.json", include_str!("../schemas/image-layout-schema.json")),
];

/// The embedded document holding the root schema for `media_type`.
pub fn schema_document(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Descriptor => "content-descriptor.json",
        MediaType::Manifest => "image-manifest-schema.json",
        MediaType::ManifestList => "manifest-list-schema.json",
        MediaType::ImageLayout => "image-layout-schema.json",
    }
}

static BUILTIN: OnceLock<Result<SchemaRegistry, SchemaError>> = OnceLock::new();

/// Compiled schemas keyed by media type identifier.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaNode>,
    loader: Loader,
}

impl SchemaRegistry {
    /// The process-wide registry of built-in schemas.
    ///
    /// Compiled on first use. A failure here means an embedded schema is
    /// malformed; the same error is returned on every call.
    pub fn builtin() -> Result<&'static SchemaRegistry, SchemaError> {
        BUILTIN
            .get_or_init(|| {
                let registry = Self::compile_builtin();
                match &registry {
                    Ok(r) => tracing::debug!(schemas = r.len(), "initialised built-in schema registry"),
                    Err(e) => tracing::error!(error = %e, "built-in schema registry is invalid"),
                }
                registry
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Compile a fresh, owned copy of the built-in schemas.
    pub fn compile_builtin() -> Result<Self, SchemaError> {
        let bindings: Vec<(&str, &str)> = MediaType::ALL
            .iter()
            .map(|mt| (mt.as_str(), schema_document(*mt)))
            .collect();
        Self::from_documents(&BUILTIN_DOCUMENTS, &bindings)
    }

    /// Compile caller-supplied schema documents.
    ///
    /// `documents` are `(name, json text)` pairs; names are what `$ref`s
    /// refer to. `bindings` are `(media type, document name)` pairs.
    ///
    /// # Errors
    ///
    /// Any malformed document, unresolvable reference, or binding to an
    /// unknown document.
    pub fn from_documents(documents: &[(&str, &str)], bindings: &[(&str, &str)]) -> Result<Self, SchemaError> {
        let mut compiler = SchemaCompiler::new();
        for (name, text) in documents {
            compiler.add_document(*name, text)?;
        }

        let mut registry = Self::default();
        for (media_type, document) in bindings {
            let node = compiler.compile(document)?;
            registry.insert(*media_type, node);
        }
        Ok(registry)
    }

    /// Bind `schema` to `media_type`, replacing any previous binding.
    pub fn insert(&mut self, media_type: impl Into<String>, schema: SchemaNode) -> &mut Self {
        self.schemas.insert(media_type.into(), schema);
        self
    }

    /// Use `loader` when validating raw bytes.
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered media type identifiers, sorted.
    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// The schema bound to `media_type`.
    pub fn schema(&self, media_type: &str) -> Result<&SchemaNode, SchemaError> {
        self.schemas
            .get(media_type)
            .ok_or_else(|| SchemaError::UnregisteredMediaType(media_type.to_string()))
    }

    /// Validate an already loaded document.
    pub fn validate(&self, media_type: &str, document: &Document) -> Result<(), ValidationError> {
        let schema = self.schema(media_type)?;
        let result = evaluate::validate(document, schema);
        tracing::trace!(
            media_type,
            violations = result.as_ref().err().map_or(0, |v| v.len()),
            "validated document"
        );
        result.map_err(|violations| ValidationError::Invalid {
            media_type: media_type.to_string(),
            violations,
        })
    }

    /// Load and validate raw bytes.
    pub fn validate_slice(&self, media_type: &str, bytes: &[u8]) -> Result<(), ValidationError> {
        // Resolve the schema first so a bad media type is reported as such,
        // not masked by a syntax error in the document.
        self.schema(media_type)?;
        let document = self.loader.load_slice(bytes)?;
        self.validate(media_type, &document)
    }

    /// Read `reader` to the end, then load and validate it.
    pub fn validate_reader<R: Read>(&self, media_type: &str, reader: R) -> Result<(), ValidationError> {
        self.schema(media_type)?;
        let document = self.loader.load_reader(reader)?;
        self.validate(media_type, &document)
    }
}

/// Validate a stream against the built-in schema for `media_type`.
pub fn validate_reader<R: Read>(media_type: MediaType, reader: R) -> Result<(), ValidationError> {
    SchemaRegistry::builtin()?.validate_reader(media_type.as_str(), reader)
}

/// Validate bytes against the built-in schema for `media_type`.
pub fn validate_slice(media_type: MediaType, bytes: &[u8]) -> Result<(), ValidationError> {
    SchemaRegistry::builtin()?.validate_slice(media_type.as_str(), bytes)
}
