//! Data layer - Static names and constants
//!
//! This module contains the static data used by the table generator:
//! - Default library names of the table symbols and styles
//! - Metadata keys persisted on generated nodes
//! - Raw form field aliases

pub mod constants;
pub mod fields;

// Re-export commonly used items
pub use constants::{
    COL_GROUP_TAG, INSERTION_GAP, META_ID, META_OPTIONS, META_TYPE, ROW_GROUP_TAG, TABLE_TAG,
};
pub use fields::{canonical_field, FIELD_ALIASES};
