//! # CLI Configuration
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. An optional YAML file (`--config`).
//! 2. Environment variables (`IMGIDX_MAX_DEPTH`).
//! 3. Command-line flags.
//!
//! ```yaml
//! max_depth: 32
//! default_media_type: manifest-list
//! format: json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use imgidx_core::options::{DEFAULT_MAX_DEPTH, MAX_DEPTH_ENV};
use imgidx_core::{LoaderOptions, MediaType};

/// How `validate` prints its report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `OK:` / `FAIL:` lines and a summary.
    #[default]
    Text,
    /// A single JSON report on stdout.
    Json,
}

/// Contents of the `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    pub max_depth: Option<usize>,
    /// Full identifier or short name, e.g. `manifest-list`.
    pub default_media_type: Option<String>,
    pub format: Option<OutputFormat>,
}

impl CliConfig {
    /// Read a config file, or return the empty config when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file parses as YAML null.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Values given on the command line, all optional.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_depth: Option<usize>,
    pub media_type: Option<String>,
    pub format: Option<OutputFormat>,
}

/// Fully resolved settings for one `validate` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub loader: LoaderOptions,
    pub media_type: MediaType,
    pub format: OutputFormat,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn resolve(config: &CliConfig, overrides: &Overrides) -> Result<Self> {
        Self::resolve_with(config, overrides, |name| std::env::var(name).ok())
    }

    /// Resolve through an arbitrary variable lookup.
    pub fn resolve_with(
        config: &CliConfig,
        overrides: &Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut max_depth = config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if lookup(MAX_DEPTH_ENV).is_some() {
            max_depth = LoaderOptions::from_vars(&lookup)?.max_depth;
        }
        if let Some(depth) = overrides.max_depth {
            max_depth = depth;
        }
        let loader = LoaderOptions::with_max_depth(max_depth)?;

        let media_type = match overrides
            .media_type
            .as_deref()
            .or(config.default_media_type.as_deref())
        {
            Some(name) => name.parse::<MediaType>()?,
            None => MediaType::ManifestList,
        };

        let format = overrides.format.or(config.format).unwrap_or_default();

        Ok(Self {
            loader,
            media_type,
            format,
        })
    }
}
