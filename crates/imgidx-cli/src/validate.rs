//! # Validate Subcommand
//!
//! Loads each named document and checks it against the built-in schema for
//! one media type.
//!
//! A document that fails to parse, or parses but does not conform, counts
//! as a failure (exit 1). Failing to read a path or a broken built-in
//! schema is an operational error (exit 2).

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use imgidx_core::{Loader, MediaType};
use imgidx_schema::{SchemaRegistry, ValidationError, Violation};

use crate::config::{CliConfig, OutputFormat, Overrides, Settings};
use crate::{EXIT_INVALID, EXIT_OK};

/// Arguments for the `imgidx validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Media type to validate against: a full identifier or one of
    /// `manifest-list`, `index`, `manifest`, `descriptor`, `layout`.
    #[arg(long, short = 't')]
    pub media_type: Option<String>,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum nesting depth of a document.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Documents to validate. `-` reads standard input.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

impl ValidateArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_depth: self.max_depth,
            media_type: self.media_type.clone(),
            format: self.format,
        }
    }
}

/// Outcome for one input.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub path: String,
    pub valid: bool,
    /// Set when the document could not be loaded at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// Outcome for a whole run.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub media_type: MediaType,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub documents: Vec<DocumentReport>,
}

impl ValidationReport {
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            EXIT_INVALID
        } else {
            EXIT_OK
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document passed, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let settings = Settings::resolve(config, &args.overrides())?;
    let report = validate_paths(&args.paths, &settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match settings.format {
        OutputFormat::Text => write_text(&report, &mut out)?,
        OutputFormat::Json => write_json(&report, &mut out)?,
    }
    out.flush()?;

    Ok(report.exit_code())
}

/// Validate every path in order.
pub fn validate_paths(paths: &[PathBuf], settings: &Settings) -> Result<ValidationReport> {
    let registry = SchemaRegistry::builtin().context("built-in schemas failed to compile")?;
    let loader = Loader::new(settings.loader);
    tracing::info!(
        media_type = %settings.media_type,
        documents = paths.len(),
        "validating documents"
    );

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = read_input(path)?;
        documents.push(validate_bytes(
            registry,
            &loader,
            settings.media_type,
            display_name(path),
            &bytes,
        )?);
    }

    let passed = documents.iter().filter(|d| d.valid).count();
    Ok(ValidationReport {
        media_type: settings.media_type,
        total: documents.len(),
        passed,
        failed: documents.len() - passed,
        documents,
    })
}

/// Validate one buffer. Load and conformance failures land in the report;
/// only schema problems are returned as errors.
pub fn validate_bytes(
    registry: &SchemaRegistry,
    loader: &Loader,
    media_type: MediaType,
    path: String,
    bytes: &[u8],
) -> Result<DocumentReport> {
    let mut report = DocumentReport {
        path,
        valid: false,
        error: None,
        violations: Vec::new(),
    };

    let document = match loader.load_slice(bytes) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!(path = %report.path, error = %e, "document failed to load");
            report.error = Some(e.to_string());
            return Ok(report);
        }
    };

    match registry.validate(media_type.as_str(), &document) {
        Ok(()) => report.valid = true,
        Err(ValidationError::Invalid { violations, .. }) => {
            tracing::debug!(path = %report.path, violations = violations.len(), "document does not conform");
            report.violations = violations.into_inner();
        }
        Err(e) => return Err(e).context("schema lookup failed"),
    }
    Ok(report)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        return read_stream(std::io::stdin().lock()).context("failed to read standard input");
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Drain a stream such as standard input.
fn read_stream(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

/// `OK:` / `FAIL:` per document, then `Documents: N/M passed`.
pub fn write_text(report: &ValidationReport, out: &mut impl Write) -> std::io::Result<()> {
    for doc in &report.documents {
        if doc.valid {
            writeln!(out, "OK: {}", doc.path)?;
            continue;
        }
        writeln!(out, "FAIL: {}", doc.path)?;
        if let Some(error) = &doc.error {
            writeln!(out, "  {error}")?;
        }
        for violation in &doc.violations {
            writeln!(out, "  {violation}")?;
        }
    }
    writeln!(out, "Documents: {}/{} passed", report.passed, report.total)
}

pub fn write_json(report: &ValidationReport, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
