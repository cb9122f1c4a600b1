//! Loader configuration.
//!
//! Defaults suit manifest-sized documents. Override via environment
//! variables or explicit construction.

use crate::error::ConfigError;

/// Environment variable overriding [`LoaderOptions::max_depth`].
pub const MAX_DEPTH_ENV: &str = "IMGIDX_MAX_DEPTH";

/// Default nesting limit. Manifest lists nest five levels deep; this leaves
/// ample room for extension fields.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// `serde_json` refuses to open a 128th nested container, so 127 is the
/// deepest limit that can actually be reached.
pub(crate) const PARSER_DEPTH_CEILING: usize = 127;

/// Options controlling how input bytes become a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Maximum nesting of arrays and objects. The root container is depth 1.
    pub max_depth: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl LoaderOptions {
    /// Options with an explicit depth limit.
    pub fn with_max_depth(max_depth: usize) -> Result<Self, ConfigError> {
        let options = Self { max_depth };
        options.check()?;
        Ok(options)
    }

    /// Load options from environment variables.
    ///
    /// Variables:
    /// - `IMGIDX_MAX_DEPTH` (default: 64, range 1..=127)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load options through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(raw) = lookup(MAX_DEPTH_ENV) {
            options.max_depth = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: MAX_DEPTH_ENV.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        options.check()?;
        Ok(options)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > PARSER_DEPTH_CEILING {
            return Err(ConfigError::OutOfRange {
                name: "max_depth".to_string(),
                reason: format!(
                    "must be between 1 and {PARSER_DEPTH_CEILING}, got {}",
                    self.max_depth
                ),
            });
        }
        Ok(())
    }
}
