//! Core table generation
//!
//! This module contains the generation pipeline:
//! - `options`: raw field map to validated options
//! - `layout`: pure planning of the node tree and its frames
//! - `builder`: writing a plan into a host document
//! - `edit`: regenerating an existing table in place

pub mod builder;
pub mod edit;
pub mod layout;
pub mod options;

pub use builder::{build_table, materialize, BuildContext, BuildOutput, Materialized};
pub use edit::{
    edit_options, edit_table, find_table, harvest_edits, is_table, stored_options, EditReport,
    ManualEdits,
};
pub use layout::{plan_table, Frame, NodeKind, OverrideValue, TablePlan};
pub use options::{
    normalize, normalize_with, validate, GroupBy, LibraryName, Mode, Options, RawOptions, MAX_COUNT,
};
