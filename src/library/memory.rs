//! In-memory symbol and style libraries
//!
//! Libraries are plain data and load from JSON:
//!
//! ```json
//! { "libraries": [ {
//!     "name": "design-system",
//!     "symbols": [ { "id": "s1", "name": "Table/Row/Standard", "width": 600, "height": 56,
//!                    "overrides": [ { "id": "o1", "property": "layerStyle",
//!                                     "layerName": "🎨 Background style" } ] } ],
//!     "styles": [ { "id": "st1", "name": "Table/Row/_Odd (impair)" } ]
//! } ] }
//! ```

use std::future::{ready, Future};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::binding::{BindingTable, OverridePoint, OverrideProperty};
use super::{LibraryResolver, ResolveError, StyleHandle, SymbolHandle};
use crate::core::options::LibraryName;
use crate::data::constants::{
    CELL_SYMBOL, DEFAULT_CELL_CONTENT_SYMBOL, DEFAULT_CELL_STYLE, EVEN_ROW_STYLE,
    HEADER_LABEL_SYMBOL, HEADER_ROW_STYLE, ODD_ROW_STYLE, ROW_SYMBOL,
};
use crate::utils::error::{DependencyKind, TableError, TableResult};

/// Symbol master definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDef {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub overrides: Vec<OverridePoint>,
}

impl SymbolDef {
    fn handle(&self) -> SymbolHandle {
        SymbolHandle {
            id: self.id.clone(),
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            bindings: BindingTable::from_override_points(&self.overrides),
        }
    }
}

/// Shared layer style definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDef {
    pub id: String,
    pub name: String,
}

/// One named library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLibrary {
    pub name: String,
    #[serde(default)]
    pub symbols: Vec<SymbolDef>,
    #[serde(default)]
    pub styles: Vec<StyleDef>,
}

impl MemoryLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// A library holding every default table symbol and style
    pub fn standard(name: impl Into<String>) -> Self {
        let mut lib = Self::new(name);
        lib.add_symbol(
            ROW_SYMBOL,
            600.0,
            56.0,
            vec![OverridePoint::new(
                "row/background",
                OverrideProperty::LayerStyle,
                "🎨 Background style",
            )],
        );
        lib.add_symbol(
            CELL_SYMBOL,
            200.0,
            40.0,
            vec![
                OverridePoint::new(
                    "cell/content",
                    OverrideProperty::SymbolId,
                    DEFAULT_CELL_CONTENT_SYMBOL,
                ),
                OverridePoint::new("cell/style", OverrideProperty::LayerStyle, "Cell style"),
                OverridePoint::new("cell/label", OverrideProperty::StringValue, "Label"),
            ],
        );
        lib.add_symbol(
            HEADER_LABEL_SYMBOL,
            200.0,
            24.0,
            vec![OverridePoint::new(
                "header/label",
                OverrideProperty::StringValue,
                "Label",
            )],
        );
        lib.add_symbol(
            DEFAULT_CELL_CONTENT_SYMBOL,
            200.0,
            40.0,
            vec![OverridePoint::new(
                "content/label",
                OverrideProperty::StringValue,
                "Label",
            )],
        );
        for style in [DEFAULT_CELL_STYLE, ODD_ROW_STYLE, EVEN_ROW_STYLE, HEADER_ROW_STYLE] {
            lib.add_style(style);
        }
        lib
    }

    /// Add a symbol whose id is derived from the library and symbol names
    pub fn add_symbol(
        &mut self,
        name: &str,
        width: f64,
        height: f64,
        overrides: Vec<OverridePoint>,
    ) {
        self.symbols.push(SymbolDef {
            id: format!("{}:symbol:{}", self.name, name),
            name: name.to_string(),
            width,
            height,
            overrides,
        });
    }

    /// Add a style whose id is derived from the library and style names
    pub fn add_style(&mut self, name: &str) {
        self.styles.push(StyleDef {
            id: format!("{}:style:{}", self.name, name),
            name: name.to_string(),
        });
    }

    pub fn symbol(&self, name: &str) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn style(&self, name: &str) -> Option<&StyleDef> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Drop a symbol, returning whether it existed
    pub fn remove_symbol(&mut self, name: &str) -> bool {
        let before = self.symbols.len();
        self.symbols.retain(|s| s.name != name);
        self.symbols.len() != before
    }

    /// Drop a style, returning whether it existed
    pub fn remove_style(&mut self, name: &str) -> bool {
        let before = self.styles.len();
        self.styles.retain(|s| s.name != name);
        self.styles.len() != before
    }
}

/// Collection of libraries the document links to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Libraries {
    pub libraries: Vec<MemoryLibrary>,
}

impl Libraries {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single standard library named `design-system`
    pub fn standard() -> Self {
        Self::new().with(MemoryLibrary::standard("design-system"))
    }

    pub fn with(mut self, library: MemoryLibrary) -> Self {
        self.libraries.push(library);
        self
    }

    pub fn from_json(input: &str) -> TableResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| TableError::Config(format!("invalid library file: {}", e)))
    }

    /// First library selected by `name`
    pub fn find(&self, name: &LibraryName) -> Option<&MemoryLibrary> {
        self.libraries.iter().find(|lib| name.matches(&lib.name))
    }

    fn library_for(
        &self,
        library: &LibraryName,
        kind: DependencyKind,
        name: &str,
    ) -> Result<&MemoryLibrary, ResolveError> {
        self.find(library).ok_or_else(|| ResolveError::NoLibrary {
            kind,
            name: name.to_string(),
            library: library.to_string(),
        })
    }

    pub fn lookup_symbol(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> Result<SymbolHandle, ResolveError> {
        let lib = self.library_for(library, DependencyKind::Symbol, name)?;
        trace!(library = %lib.name, symbol = name, "looking up symbol");
        lib.symbol(name)
            .map(SymbolDef::handle)
            .ok_or_else(|| ResolveError::NotFound {
                kind: DependencyKind::Symbol,
                name: name.to_string(),
                library: lib.name.clone(),
            })
    }

    pub fn lookup_style(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> Result<StyleHandle, ResolveError> {
        let lib = self.library_for(library, DependencyKind::Style, name)?;
        trace!(library = %lib.name, style = name, "looking up layer style");
        lib.style(name)
            .map(|s| StyleHandle {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .ok_or_else(|| ResolveError::NotFound {
                kind: DependencyKind::Style,
                name: name.to_string(),
                library: lib.name.clone(),
            })
    }
}

impl LibraryResolver for Libraries {
    fn resolve_symbol(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> impl Future<Output = Result<SymbolHandle, ResolveError>> {
        ready(self.lookup_symbol(library, name))
    }

    fn resolve_style(
        &self,
        library: &LibraryName,
        name: &str,
    ) -> impl Future<Output = Result<StyleHandle, ResolveError>> {
        ready(self.lookup_style(library, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::BindTarget;

    #[test]
    fn test_standard_library_bindings() {
        let libs = Libraries::standard();
        let cell = libs.lookup_symbol(&LibraryName::default(), CELL_SYMBOL).unwrap();
        assert_eq!(cell.height, 40.0);
        assert!(cell.bindings.contains(BindTarget::Text));
        assert!(cell.bindings.contains(BindTarget::CellStyle));
        assert!(cell.bindings.contains(BindTarget::ContentSymbol));

        let row = libs.lookup_symbol(&LibraryName::default(), ROW_SYMBOL).unwrap();
        assert_eq!(row.bindings.get(BindTarget::BackgroundStyle), Some("row/background"));
    }

    #[test]
    fn test_library_selection() {
        let libs = Libraries::new()
            .with(MemoryLibrary::new("legacy-kit"))
            .with(MemoryLibrary::standard("design-system 2024"));
        assert_eq!(
            libs.find(&LibraryName::default()).map(|l| l.name.as_str()),
            Some("design-system 2024")
        );
        assert!(libs.find(&LibraryName::contains("kit")).is_some());
        assert!(libs.find(&LibraryName::contains("nothing")).is_none());
    }

    #[test]
    fn test_not_found() {
        let libs = Libraries::standard();
        let err = libs.lookup_style(&LibraryName::default(), "Missing").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                kind: DependencyKind::Style,
                name: "Missing".to_string(),
                library: "design-system".to_string(),
            }
        );
    }

    #[test]
    fn test_json_round_trip_of_fixture() {
        let libs = Libraries::standard();
        let json = serde_json::to_string(&libs).unwrap();
        assert_eq!(Libraries::from_json(&json).unwrap(), libs);
    }
}
