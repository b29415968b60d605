//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Confirmation messages and pluralization

pub mod error;
pub mod message;

// Re-export commonly used items
pub use error::{BuildWarning, DependencyKind, TableError, TableResult, ValidationError};
pub use message::{inserted_message, pluralize, updated_message, Locale};
