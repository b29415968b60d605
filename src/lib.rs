//! # table-generator
//!
//! Procedural table layouts for design documents, built from the symbols and
//! layer styles of a linked library.
//!
//! ## Features
//!
//! - **Deterministic Layout**: header band, row stripes and cells planned from a flat option record
//! - **Row or Column Grouping**: the same geometry grouped along either axis
//! - **Library Bindings**: override points resolved once into typed bindings
//! - **Edit Mode**: regenerate a table in place, keeping manual text edits
//! - **Typed Commands**: submit, cancel and resize messages from the options window
//! - **WASM Support**: option normalization and layout previews in the browser
//!
//! ## Usage Examples
//!
//! ### Planning a Table
//!
//! ```rust
//! use table_generator::{preview_table, normalize_options, Libraries, LibraryCatalog, NodeKind};
//!
//! let options = normalize_options(r#"{"rowCount": "2", "colCount": "3"}"#).unwrap();
//! let plan = preview_table(&Libraries::standard(), &options, &LibraryCatalog::default()).unwrap();
//!
//! assert_eq!(plan.count(NodeKind::Cell), 6);
//! assert_eq!(plan.cell(1, 2).unwrap().frame.x, 432.0);
//! ```
//!
//! ### Building Into a Document
//!
//! ```rust
//! use futures::executor::block_on;
//! use table_generator::{build_table, BuildContext, Libraries, MemoryDocument, Options};
//!
//! let mut document = MemoryDocument::new();
//! let options = Options { row_count: 2, col_count: 1, ..Default::default() };
//! let output = block_on(build_table(
//!     &Libraries::standard(),
//!     &mut document,
//!     &options,
//!     &BuildContext::default(),
//! ))
//! .unwrap();
//!
//! assert_eq!(output.message, "Tableau de 2 lignes et 1 colonne inséré dans le document !");
//! ```

/// Command bridge for the options window
pub mod bridge;

/// TOML configuration
pub mod config;

/// Core generation modules
pub mod core;

/// Data layer - static names and constants
pub mod data;

/// Host document abstraction
pub mod host;

/// Symbol and layer style resolution
pub mod library;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

use futures::executor::block_on;

// Re-export core generation
pub use crate::core::builder::{build_table, materialize, BuildContext, BuildOutput};
pub use crate::core::edit::{
    edit_options, edit_table, find_table, harvest_edits, stored_options, EditReport,
};
pub use crate::core::layout::{
    cell_label, header_label, plan_table, Frame, NodeKind, OverrideValue, TablePlan,
};
pub use crate::core::options::{
    normalize, normalize_with, validate, GroupBy, LibraryName, Mode, Options, RawOptions,
};

// Re-export collaborators
pub use bridge::{form_state, Command, Dispatcher, FormState, Outcome};
pub use config::Config;
pub use host::{HostDocument, MemoryDocument, NodeId};
pub use library::{
    resolve_all, Libraries, LibraryCatalog, LibraryResolver, MemoryLibrary, ResolvedHandles,
};

// Re-export utilities
pub use utils::error::{BuildWarning, TableError, TableResult, ValidationError};
pub use utils::message::Locale;

/// Parse, normalize and validate a posted field map
///
/// # Arguments
/// * `input` - JSON object, or a JSON string holding one
///
/// # Returns
/// Options with every omitted field defaulted
pub fn normalize_options(input: &str) -> TableResult<Options> {
    Ok(Options::from_json(input)?)
}

/// Resolve the library handles and plan a table without touching a document
pub fn preview_table<R: LibraryResolver>(
    resolver: &R,
    options: &Options,
    catalog: &LibraryCatalog,
) -> TableResult<TablePlan> {
    let handles = block_on(resolve_all(resolver, options, catalog))?;
    Ok(plan_table(options, &handles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_options_defaults() {
        let options = normalize_options("{}").unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_normalize_options_double_encoded() {
        let options = normalize_options(r#""{\"rowCount\": \"4\"}""#).unwrap();
        assert_eq!(options.rows(), 4);
    }

    #[test]
    fn test_normalize_options_rejects_zero() {
        let err = normalize_options(r#"{"colCount": 0}"#).unwrap_err();
        assert!(matches!(err, TableError::Validation(_)));
    }

    #[test]
    fn test_preview_counts() {
        let options = Options {
            row_count: 3,
            col_count: 4,
            group_by: GroupBy::Column,
            ..Default::default()
        };
        let catalog = LibraryCatalog::default();
        let plan = preview_table(&Libraries::standard(), &options, &catalog).unwrap();
        assert_eq!(plan.count(NodeKind::Row), 3);
        assert_eq!(plan.count(NodeKind::Cell), 12);
        assert_eq!(plan.count(NodeKind::GroupItem), 4);
    }

    #[test]
    fn test_preview_missing_library() {
        let options = normalize_options(r#"{"libraryName": "brand-kit"}"#).unwrap();
        let catalog = LibraryCatalog::default();
        let err = preview_table(&Libraries::standard(), &options, &catalog).unwrap_err();
        assert!(matches!(err, TableError::MissingDependency { .. }));
    }
}
