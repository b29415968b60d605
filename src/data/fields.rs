//! Raw form field names
//!
//! The options form posts a flat map keyed by camelCase field names. Older
//! revisions of the form used different names for some fields; they are
//! folded into the current ones before defaulting.

use phf::phf_map;

/// Legacy field name to current field name
pub static FIELD_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "colWidth" => "cellWidth",
    "rows" => "rowCount",
    "cols" => "colCount",
    "library" => "libraryName",
};

/// Resolve a posted field name to its current name
pub fn canonical_field(name: &str) -> &str {
    FIELD_ALIASES.get(name).copied().unwrap_or(name)
}
