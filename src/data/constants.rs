//! Constants shared by the planner, the builder and the edit pass
//!
//! This module contains:
//! - Default symbol and layer style names of the design-system library
//! - Metadata keys and tags persisted on generated nodes
//! - Fixed geometry used when inserting a table next to the selection

// ============================================================================
// Library names
// ============================================================================

/// Library name pattern used when the options do not name one
pub const DEFAULT_LIBRARY_PATTERN: &str = "^design-system";

/// Symbol used for the header band and every row background
pub const ROW_SYMBOL: &str = "Table/Row/Standard";

/// Symbol instantiated for every cell
pub const CELL_SYMBOL: &str = "Table/Cell/Default";

/// Symbol instantiated for every header label
pub const HEADER_LABEL_SYMBOL: &str = "Table/Header Label/Left/Default";

/// Layer style applied to rows with an even 0-based index
pub const ODD_ROW_STYLE: &str = "Table/Row/_Odd (impair)";

/// Layer style applied to rows with an odd 0-based index
pub const EVEN_ROW_STYLE: &str = "Table/Row/_Even (pair)";

/// Layer style applied to the header band
pub const HEADER_ROW_STYLE: &str = "Table/Row/_Header";

/// Default layer style of the cell background
pub const DEFAULT_CELL_STYLE: &str = "Table/Cell/Default/Transparent";

/// Default symbol swapped into the cell content slot
pub const DEFAULT_CELL_CONTENT_SYMBOL: &str = "Table/Cell Content/Default/Text";

// ============================================================================
// Persisted metadata
// ============================================================================

/// Metadata key holding the node tag
pub const META_TYPE: &str = "type";

/// Metadata key holding the originating options on the root
pub const META_OPTIONS: &str = "options";

/// Metadata key holding the axis index of a group item
pub const META_ID: &str = "id";

/// Tag stored on the table root
pub const TABLE_TAG: &str = "table";

/// Tag stored on a group item when grouping by row
pub const ROW_GROUP_TAG: &str = "table:row";

/// Tag stored on a group item when grouping by column
pub const COL_GROUP_TAG: &str = "table:col";

// ============================================================================
// Geometry and window
// ============================================================================

/// Horizontal distance between the selection and a newly inserted table
pub const INSERTION_GAP: f64 = 100.0;

/// Fixed width of the options window
pub const WINDOW_WIDTH: f64 = 280.0;

/// Initial height of the options window
pub const WINDOW_HEIGHT: f64 = 384.0;

/// Identifier of the options window
pub const WINDOW_IDENTIFIER: &str = "table-generator.webview";
