//! # Error Types
//!
//! Errors raised before any schema is consulted: malformed input bytes and
//! invalid engine configuration. Schema and validation errors live in
//! `imgidx-schema`.

use std::fmt;

use thiserror::Error;

/// Which stage of parsing rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorCategory {
    /// Input is not syntactically valid JSON.
    Syntax,
    /// Input ended in the middle of a value.
    Eof,
    /// Input is valid JSON but cannot be represented (e.g. a lone surrogate).
    Data,
}

impl fmt::Display for SyntaxErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax error",
            Self::Eof => "unexpected end of input",
            Self::Data => "unrepresentable data",
        })
    }
}

/// The input is not a well-formed JSON document.
///
/// Line and column are 1-based and point at the character where parsing
/// stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category} at line {line} column {column}: {message}")]
pub struct SyntaxError {
    pub category: SyntaxErrorCategory,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for SyntaxError {
    fn from(e: serde_json::Error) -> Self {
        let category = match e.classify() {
            serde_json::error::Category::Eof => SyntaxErrorCategory::Eof,
            serde_json::error::Category::Data => SyntaxErrorCategory::Data,
            _ => SyntaxErrorCategory::Syntax,
        };
        // serde_json's Display appends " at line L column C"; keep only the reason.
        let full = e.to_string();
        let message = match full.rfind(" at line ") {
            Some(idx) => full[..idx].to_string(),
            None => full,
        };
        Self {
            category,
            line: e.line(),
            column: e.column(),
            message,
        }
    }
}

/// Failure to turn input bytes into a document tree. No partial tree is
/// ever produced.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The bytes are not well-formed JSON.
    #[error("invalid document: {0}")]
    Syntax(#[from] SyntaxError),

    /// The document nests arrays/objects deeper than the configured limit.
    #[error("document nesting exceeds the maximum depth of {limit}")]
    TooDeep {
        /// The configured maximum depth.
        limit: usize,
    },

    /// Reading the input stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::Io(e.into())
        } else {
            Self::Syntax(e.into())
        }
    }
}

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },

    /// A setting is outside its permitted range.
    #[error("invalid setting {name}: {reason}")]
    OutOfRange { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        let syntax = SyntaxError::from(err);
        assert_eq!(syntax.category, SyntaxErrorCategory::Syntax);
        assert_eq!(syntax.line, 2);
        assert!(!syntax.message.contains("at line"));
        assert!(syntax.to_string().contains("line 2"));
    }

    #[test]
    fn test_syntax_error_eof() {
        let err = serde_json::from_str::<serde_json::Value>("[1, 2").unwrap_err();
        assert_eq!(SyntaxError::from(err).category, SyntaxErrorCategory::Eof);
    }
}
