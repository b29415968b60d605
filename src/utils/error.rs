//! Error handling for table generation
//!
//! This module provides a unified error type and result type for
//! normalizing options, resolving library dependencies and mutating the
//! host document.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::host::NodeId;

/// Options that could not be coerced or are out of range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A field holds a value of the wrong shape or outside its range
    #[error("'{field}' {reason}")]
    Field { field: String, reason: String },
    /// An enumerated field holds an unknown value
    #[error("unknown value '{value}' for '{field}'")]
    UnknownVariant { field: String, value: String },
    /// Edit mode was requested without a table to edit
    #[error("edit mode requires a selected table")]
    MissingTarget,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::UnknownVariant {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Kind of library entry a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Symbol,
    Style,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Symbol => write!(f, "symbol"),
            DependencyKind::Style => write!(f, "layer style"),
        }
    }
}

/// Table generation error type
#[derive(Debug, Error)]
pub enum TableError {
    /// Malformed or out-of-range options
    #[error("Invalid options: {0}")]
    Validation(#[from] ValidationError),
    /// A required symbol or style did not resolve in the active library
    #[error("Missing {kind} '{name}' in library '{library}'")]
    MissingDependency {
        kind: DependencyKind,
        name: String,
        library: String,
    },
    /// No document to attach the table to
    #[error("No active document")]
    NoActiveDocument,
    /// The edit target carries no table tag
    #[error("Node {0} is not a generated table")]
    NotATable(NodeId),
    /// The host document does not know the node
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    /// Persisted metadata could not be read or written
    #[error("Unreadable table metadata: {0}")]
    Metadata(String),
    /// An inbound message could not be decoded
    #[error("Malformed message: {0}")]
    Protocol(String),
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TableError {
    pub fn missing(
        kind: DependencyKind,
        name: impl Into<String>,
        library: impl Into<String>,
    ) -> Self {
        TableError::MissingDependency {
            kind,
            name: name.into(),
            library: library.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TableError::Validation(ValidationError::field(field, reason))
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        TableError::Metadata(message.into())
    }

    /// Whether the error was raised before the document was touched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TableError::Validation(_)
                | TableError::MissingDependency { .. }
                | TableError::NoActiveDocument
                | TableError::NotATable(_)
                | TableError::Protocol(_)
                | TableError::Config(_)
        )
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Non-fatal issue raised while materializing a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildWarning {
    pub message: String,
    pub node: Option<NodeId>,
}

impl BuildWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node: None,
        }
    }

    pub fn at(node: NodeId, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node: Some(node),
        }
    }
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(node) = self.node {
            write!(f, "Warning at node {}: {}", node, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}
