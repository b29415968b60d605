//! Symbol and layer style resolution
//!
//! The builder depends on a library capability: resolve a named symbol or
//! layer style within the library selected by the options, or fail. The
//! [`LibraryResolver`] trait is that capability:
//!
//! - [`Libraries`]: in-memory library collection (tests, CLI, WASM previews)
//!
//! Every handle a table needs is resolved by [`resolve_all`] before the
//! first node is created.

pub mod binding;
pub mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::options::{LibraryName, Options};
use crate::data::constants::{
    CELL_SYMBOL, EVEN_ROW_STYLE, HEADER_LABEL_SYMBOL, HEADER_ROW_STYLE, ODD_ROW_STYLE, ROW_SYMBOL,
};
use crate::utils::error::{DependencyKind, TableError, TableResult};

pub use binding::{BindTarget, BindingTable, OverridePoint, OverrideProperty};
pub use memory::{Libraries, MemoryLibrary, StyleDef, SymbolDef};

/// Imported symbol, ready to be instantiated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolHandle {
    pub id: String,
    pub name: String,
    /// Intrinsic width of a fresh instance
    pub width: f64,
    /// Intrinsic height of a fresh instance
    pub height: f64,
    pub bindings: BindingTable,
}

/// Imported shared layer style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleHandle {
    pub id: String,
    pub name: String,
}

/// Failure to resolve one name
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("no library matches '{library}'")]
    NoLibrary {
        kind: DependencyKind,
        name: String,
        library: String,
    },
    #[error("{kind} '{name}' not found in '{library}'")]
    NotFound {
        kind: DependencyKind,
        name: String,
        library: String,
    },
}

impl From<ResolveError> for TableError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoLibrary {
                kind,
                name,
                library,
            }
            | ResolveError::NotFound {
                kind,
                name,
                library,
            } => TableError::missing(kind, name, library),
        }
    }
}

/// Resolve named symbols and layer styles within a library
pub trait LibraryResolver {
    fn resolve_symbol(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> impl Future<Output = Result<SymbolHandle, ResolveError>>;

    fn resolve_style(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> impl Future<Output = Result<StyleHandle, ResolveError>>;
}

/// Library names of the symbols and styles whose names are not options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryCatalog {
    pub row_symbol: String,
    pub cell_symbol: String,
    pub header_label_symbol: String,
    pub odd_row_style: String,
    pub even_row_style: String,
    pub header_row_style: String,
}

impl Default for LibraryCatalog {
    fn default() -> Self {
        Self {
            row_symbol: ROW_SYMBOL.to_string(),
            cell_symbol: CELL_SYMBOL.to_string(),
            header_label_symbol: HEADER_LABEL_SYMBOL.to_string(),
            odd_row_style: ODD_ROW_STYLE.to_string(),
            even_row_style: EVEN_ROW_STYLE.to_string(),
            header_row_style: HEADER_ROW_STYLE.to_string(),
        }
    }
}

/// Symbol a generated node is an instance of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceRole {
    /// Header band and row backgrounds
    Row,
    Cell,
    HeaderLabel,
}

/// Every handle a table needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedHandles {
    pub row_symbol: SymbolHandle,
    pub cell_symbol: SymbolHandle,
    pub header_label_symbol: SymbolHandle,
    pub cell_content_symbol: SymbolHandle,
    pub cell_style: StyleHandle,
    pub odd_row_style: StyleHandle,
    pub even_row_style: StyleHandle,
    pub header_row_style: StyleHandle,
}

impl ResolvedHandles {
    pub fn instance(&self, role: InstanceRole) -> &SymbolHandle {
        match role {
            InstanceRole::Row => &self.row_symbol,
            InstanceRole::Cell => &self.cell_symbol,
            InstanceRole::HeaderLabel => &self.header_label_symbol,
        }
    }

    /// Background style of the row at a 0-based index
    ///
    /// Index 0 is the first visible row, which the library calls "odd".
    pub fn row_style(&self, index: usize) -> &StyleHandle {
        if index % 2 == 0 {
            &self.odd_row_style
        } else {
            &self.even_row_style
        }
    }
}

/// Resolve all eight handles concurrently, failing on the first miss
pub async fn resolve_all<R: LibraryResolver>(
    resolver: &R,
    options: &Options,
    catalog: &LibraryCatalog,
) -> TableResult<ResolvedHandles> {
    let library = &options.library_name;
    debug!(library = %library, "resolving table dependencies");

    let (
        row_symbol,
        cell_symbol,
        header_label_symbol,
        cell_content_symbol,
        cell_style,
        odd_row_style,
        even_row_style,
        header_row_style,
    ) = futures::try_join!(
        resolver.resolve_symbol(library, &catalog.row_symbol),
        resolver.resolve_symbol(library, &catalog.cell_symbol),
        resolver.resolve_symbol(library, &catalog.header_label_symbol),
        resolver.resolve_symbol(library, &options.cell_symbol_name),
        resolver.resolve_style(library, &options.cell_style_name),
        resolver.resolve_style(library, &catalog.odd_row_style),
        resolver.resolve_style(library, &catalog.even_row_style),
        resolver.resolve_style(library, &catalog.header_row_style),
    )?;

    Ok(ResolvedHandles {
        row_symbol,
        cell_symbol,
        header_label_symbol,
        cell_content_symbol,
        cell_style,
        odd_row_style,
        even_row_style,
        header_row_style,
    })
}
