//! Error types for the extractor.
//!
//! Uses the dual-error pattern: `ExtractError` for library consumers with
//! the document and node context needed to locate a problem, and the
//! lightweight [`SchemaViolation`] value for per-record problems that are
//! recovered locally.

use std::fmt;

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document source is not well-formed XML. Fatal for that document.
    #[error("Malformed document {document}: {source}")]
    MalformedDocument {
        document: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A record was built without one of its required fields.
    #[error("Schema violation in {document} at {path}: missing required field '{field}'")]
    SchemaViolation {
        document: String,
        path: String,
        field: &'static str,
    },

    /// The output table rejected a row. Fatal for the current processor.
    #[error("Sink failure while writing rows for {document}: {source}")]
    SinkFailure {
        document: String,
        #[source]
        source: csv::Error,
    },

    /// `process()` was called on a processor that already ran.
    #[error("Processor already used (state: {state}); create a new processor per document")]
    ProcessorReused { state: String },

    /// An identifier registry was handed to a processor for another document.
    #[error("Identifier registry belongs to '{expected}', cannot be used for '{found}'")]
    RegistryMismatch { expected: String, found: String },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unknown record kind requested.
    #[error("Unknown table '{0}'. Run `sts-extractor tables` for the list of tables")]
    UnknownRecordKind(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Short machine-friendly name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } => "MalformedDocument",
            Self::SchemaViolation { .. } => "SchemaViolation",
            Self::SinkFailure { .. } => "SinkFailure",
            Self::ProcessorReused { .. } => "ProcessorReused",
            Self::RegistryMismatch { .. } => "RegistryMismatch",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::UnknownRecordKind(_) => "UnknownRecordKind",
            Self::Io(_) => "Io",
        }
    }
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// A record dropped because a required field could not be resolved.
///
/// Produced by rules, collected by the processor, and never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Structural path of the offending node (see [`crate::xml::node_path`]).
    pub path: String,
    /// Name of the missing column.
    pub field: &'static str,
}

impl SchemaViolation {
    #[must_use]
    pub fn new(path: impl Into<String>, field: &'static str) -> Self {
        Self {
            path: path.into(),
            field,
        }
    }

    /// Attach the document identity, producing the library error.
    #[must_use]
    pub fn into_error(self, document: impl Into<String>) -> ExtractError {
        ExtractError::SchemaViolation {
            document: document.into(),
            path: self.path,
            field: self.field,
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing '{}' at {}", self.field, self.path)
    }
}
