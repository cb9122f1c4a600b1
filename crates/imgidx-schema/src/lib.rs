//! # imgidx-schema: Schema Validation for Image Documents
//!
//! Validates JSON documents (manifest lists, manifests, descriptors, image
//! layout headers) against declarative schemas and reports every located
//! violation.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──Loader──▶ Document ──evaluate::validate(SchemaNode)──▶ Ok | ValidationViolations
//! ```
//!
//! - [`compile`] turns JSON schema documents into [`SchemaNode`] trees,
//!   resolving `$ref`s once, up front.
//! - [`evaluate`] walks a document against a node tree. It is pure and
//!   never panics.
//! - [`registry`] binds media types to compiled schemas and ships the
//!   embedded image schemas.
//!
//! ```
//! use imgidx_core::MediaType;
//!
//! let doc = br#"{"imageLayoutVersion": "1.0.0"}"#;
//! assert!(imgidx_schema::validate_slice(MediaType::ImageLayout, doc).is_ok());
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `imgidx-core` internally.
//! - A malformed schema is a [`SchemaError`], a non-conforming document a
//!   [`ValidationError`]; the two are never conflated.
//! - Schemas are open: properties a schema does not mention are accepted.

pub mod compile;
pub mod error;
pub mod evaluate;
pub mod node;
pub mod registry;

pub use compile::{compile_value, SchemaCompiler};
pub use error::{SchemaError, ValidationError};
pub use evaluate::{validate, ValidationViolations, Violation, ViolationKind};
pub use node::{Pattern, SchemaNode, TypeSet};
pub use registry::{schema_document, validate_reader, validate_slice, SchemaRegistry, BUILTIN_DOCUMENTS};
