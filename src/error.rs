//! Error types for sbom-vulntree.
//!
//! The analysis itself never fails: incomplete SBOM records are skipped or
//! defaulted silently. Errors only surface at the edges: a document that is
//! not JSON or not a JSON object, an unreadable SBOM file, and a
//! configuration file that cannot be loaded or does not validate.

use crate::config::{ConfigError, ConfigFileError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-vulntree operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomAnalysisError {
    /// The input could not be read as an SBOM document
    #[error("Failed to parse SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// An SBOM file could not be read
    #[error("Cannot read {}: {context}", .path.display())]
    Io {
        path: PathBuf,
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be loaded
    #[error("Cannot load configuration: {0}")]
    Config(String),

    /// A loaded configuration has invalid values
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("SBOM document must be a JSON object, found {found}")]
    NotAnObject { found: String },
}

/// Convenient Result type for sbom-vulntree operations
pub type Result<T> = std::result::Result<T, SbomAnalysisError>;

// ============================================================================
// Construction
// ============================================================================

impl SbomAnalysisError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a top-level value that is not an object
    pub fn not_an_object(found: impl Into<String>) -> Self {
        Self::parse(
            "top-level document",
            ParseErrorKind::NotAnObject {
                found: found.into(),
            },
        )
    }

    /// Wrap a failed read of the SBOM file at `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            context: source.to_string(),
            source,
        }
    }

    /// Collect every validation failure of a configuration into one error.
    #[must_use]
    pub fn invalid_config(errors: &[ConfigError]) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(joined)
    }

    /// Whether this error means "the input was not an object".
    ///
    /// Callers treat this case like an empty SBOM.
    #[must_use]
    pub const fn is_not_an_object(&self) -> bool {
        matches!(
            self,
            Self::Parse {
                source: ParseErrorKind::NotAnObject { .. },
                ..
            }
        )
    }
}

impl From<serde_json::Error> for SbomAnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON serialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<ConfigFileError> for SbomAnalysisError {
    fn from(err: ConfigFileError) -> Self {
        Self::Config(err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, outermost first, so an error that crossed several
/// layers reads like `"loading fixture: reading SBOM JSON: ..."`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomAnalysisError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let outer: String = context.into();
        self.map_err(|e| e.into().prefixed(&outer))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let outer: String = f().into();
            e.into().prefixed(&outer)
        })
    }
}

impl SbomAnalysisError {
    /// Prepend `outer` to the context carried by this error.
    fn prefixed(self, outer: &str) -> Self {
        match self {
            Self::Parse { context, source } => Self::Parse {
                context: chain_context(outer, &context),
                source,
            },
            Self::Io {
                path,
                context,
                source,
            } => Self::Io {
                path,
                context: chain_context(outer, &context),
                source,
            },
            Self::Config(msg) => Self::Config(chain_context(outer, &msg)),
            Self::Validation(msg) => Self::Validation(chain_context(outer, &msg)),
        }
    }
}

/// `"outer: existing"`, or just `outer` when nothing exists yet.
fn chain_context(outer: &str, existing: &str) -> String {
    if existing.is_empty() {
        outer.to_string()
    } else {
        format!("{outer}: {existing}")
    }
}
