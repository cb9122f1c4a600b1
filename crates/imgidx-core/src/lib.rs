//! # imgidx-core: Foundational Types for imgidx
//!
//! This crate defines the data the validation engine operates on. Every
//! other crate in the workspace depends on `imgidx-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Syntactic number typing.** A [`Number`] remembers whether it was
//!    written as an integer literal or a fractional one. `7143.0` is never
//!    an integer, even though its value is whole.
//!
//! 2. **Immutable document tree.** A [`Document`] is built once by the
//!    [`loader`] and only ever borrowed afterwards.
//!
//! 3. **Single `MediaType` enum.** The set of document kinds with a
//!    built-in schema is closed; adding one forces every consumer to
//!    handle it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `imgidx-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod loader;
pub mod media_type;
pub mod options;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use document::{Document, Kind, Number, NumberKind, Object};
pub use error::{ConfigError, LoadError, SyntaxError, SyntaxErrorCategory};
pub use loader::{load_reader, load_slice, load_str, Loader};
pub use media_type::{MediaType, UnknownMediaType};
pub use options::LoaderOptions;
pub use path::{DocumentPath, PathSegment};
