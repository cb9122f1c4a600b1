//! # imgidx-cli: Command-Line Interface
//!
//! Provides the `imgidx` binary on top of `imgidx-schema`.
//!
//! ## Subcommands
//!
//! - `imgidx validate`: Validate documents against a built-in schema.
//! - `imgidx media-types`: List media types and their schema documents.
//!
//! ```bash
//! imgidx validate index.json
//! imgidx validate --media-type manifest --format json blobs/*.json
//! cat oci-layout | imgidx validate --media-type layout -
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here return an exit code.
//! - Handlers delegate to domain crates. No validation logic here.
//! - Exit codes: [`EXIT_OK`], [`EXIT_INVALID`], [`EXIT_ERROR`].

pub mod config;
pub mod media_types;
pub mod validate;

/// Every document passed.
pub const EXIT_OK: u8 = 0;

/// At least one document failed to load or to conform.
pub const EXIT_INVALID: u8 = 1;

/// The command could not run (unreadable input, bad configuration).
pub const EXIT_ERROR: u8 = 2;
