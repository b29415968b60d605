//! Table options: defaulting, coercion and validation
//!
//! The options form posts a flat field map in which numbers usually arrive
//! as strings. [`normalize`] folds that map over the default record exactly
//! once per invocation, and [`validate`] rejects out-of-range values before
//! anything touches the document.
//!
//! ```rust
//! use table_generator::{normalize, validate, GroupBy, RawOptions};
//!
//! let raw = RawOptions::from_json(r#"{"rowCount": "2", "colCount": 3, "groupBy": "column"}"#)
//!     .unwrap();
//! let options = validate(normalize(&raw).unwrap()).unwrap();
//! assert_eq!(options.rows(), 2);
//! assert_eq!(options.group_by, GroupBy::Column);
//! assert_eq!(options.cell_width, 200.0);
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::data::constants::{
    DEFAULT_CELL_CONTENT_SYMBOL, DEFAULT_CELL_STYLE, DEFAULT_LIBRARY_PATTERN,
};
use crate::data::fields::canonical_field;
use crate::utils::error::ValidationError;

/// Upper bound on rows and columns
pub const MAX_COUNT: i64 = 1000;

lazy_static! {
    static ref DEFAULT_LIBRARY: Regex = Regex::new(DEFAULT_LIBRARY_PATTERN).unwrap();
}

// ============================================================================
// Enumerated fields
// ============================================================================

/// Whether to create a fresh table or regenerate the selected one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    New,
    Edit,
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Mode::New),
            "edit" => Ok(Mode::Edit),
            other => Err(ValidationError::unknown("mode", other)),
        }
    }
}

/// Axis along which cells are grouped into containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Row,
    Column,
}

impl GroupBy {
    /// Container name prefix for one group item
    pub fn item_prefix(&self) -> &'static str {
        match self {
            GroupBy::Row => "Row",
            GroupBy::Column => "Col",
        }
    }
}

impl FromStr for GroupBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "row" => Ok(GroupBy::Row),
            "column" => Ok(GroupBy::Column),
            other => Err(ValidationError::unknown("groupBy", other)),
        }
    }
}

// ============================================================================
// Library name
// ============================================================================

/// Which library names are resolved against
///
/// A plain string matches any library whose name contains it; a pattern is
/// a regular expression. The persisted form is a string or
/// `{ "pattern": "..." }`.
#[derive(Debug, Clone)]
pub enum LibraryName {
    Contains(String),
    Pattern(Regex),
}

impl LibraryName {
    pub fn contains(name: impl Into<String>) -> Self {
        LibraryName::Contains(name.into())
    }

    pub fn pattern(source: &str) -> Result<Self, ValidationError> {
        Regex::new(source)
            .map(LibraryName::Pattern)
            .map_err(|e| {
                ValidationError::field("libraryName", format!("is not a valid pattern: {}", e))
            })
    }

    /// Check whether a library called `name` is selected
    pub fn matches(&self, name: &str) -> bool {
        match self {
            LibraryName::Contains(needle) => name.contains(needle.as_str()),
            LibraryName::Pattern(re) => re.is_match(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LibraryName::Contains(needle) => needle,
            LibraryName::Pattern(re) => re.as_str(),
        }
    }

    /// Read the persisted or posted form
    ///
    /// `"/src/"` strings and `{ "pattern": src }` objects are patterns; an
    /// empty object (a pattern that lost its source in transit) falls back to
    /// the default pattern.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::field("libraryName", "must not be empty"));
                }
                match trimmed.strip_prefix('/').and_then(|s| s.strip_suffix('/')) {
                    Some(source) if !source.is_empty() => LibraryName::pattern(source),
                    _ => Ok(LibraryName::contains(trimmed)),
                }
            }
            Value::Object(map) => match map.get("pattern") {
                Some(Value::String(source)) => LibraryName::pattern(source),
                Some(_) => Err(ValidationError::field("libraryName", "pattern must be a string")),
                None if map.is_empty() => Ok(LibraryName::default()),
                None => Err(ValidationError::field(
                    "libraryName",
                    "expected a string or a pattern",
                )),
            },
            _ => Err(ValidationError::field("libraryName", "expected a string or a pattern")),
        }
    }
}

impl Default for LibraryName {
    fn default() -> Self {
        LibraryName::Pattern(DEFAULT_LIBRARY.clone())
    }
}

impl PartialEq for LibraryName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LibraryName::Contains(a), LibraryName::Contains(b)) => a == b,
            (LibraryName::Pattern(a), LibraryName::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryName::Contains(needle) => write!(f, "{}", needle),
            LibraryName::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl Serialize for LibraryName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LibraryName::Contains(needle) => serializer.serialize_str(needle),
            LibraryName::Pattern(re) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("pattern", re.as_str())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for LibraryName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LibraryName::from_value(&value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Raw field map
// ============================================================================

/// Flat field map as posted by the options form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOptions(IndexMap<String, Value>);

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a posted payload
    ///
    /// The form serializes the field map before posting it, so a JSON string
    /// holding an object is unwrapped once.
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ValidationError::field("options", format!("is not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(RawOptions(map.into_iter().collect())),
            Value::String(inner) => Self::from_json(&inner),
            Value::Null => Ok(RawOptions::new()),
            _ => Err(ValidationError::field("options", "must be an object")),
        }
    }

    /// Set a field, builder style
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Get a field by its current or legacy name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| canonical_field(name) == field)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields with aliases resolved and blank values dropped
    fn present_fields(&self) -> IndexMap<&str, &Value> {
        let mut fields = IndexMap::new();
        for (name, value) in &self.0 {
            let blank = match value {
                Value::Null => true,
                Value::String(s) => s.trim().is_empty(),
                _ => false,
            };
            if !blank {
                fields.insert(canonical_field(name), value);
            }
        }
        fields
    }
}

impl From<&Options> for RawOptions {
    fn from(options: &Options) -> Self {
        match serde_json::to_value(options) {
            Ok(Value::Object(map)) => RawOptions(map.into_iter().collect()),
            _ => RawOptions::new(),
        }
    }
}

// ============================================================================
// Options record
// ============================================================================

/// Validated, defaulted description of the table to build
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Create a new table or regenerate the selected one
    pub mode: Mode,
    /// Library that symbol and style names are resolved against
    pub library_name: LibraryName,
    /// Number of body rows
    pub row_count: i64,
    /// Number of columns
    pub col_count: i64,
    /// Height of the header band and of every row
    pub row_height: f64,
    /// Width of every cell and header label
    pub cell_width: f64,
    /// Horizontal inset of row backgrounds around the cells
    pub row_padding: f64,
    /// Horizontal gap between adjacent cells
    pub col_gap: f64,
    /// Layer style bound to every cell
    pub cell_style_name: String,
    /// Symbol swapped into every cell's content slot
    pub cell_symbol_name: String,
    /// Grouping axis of the cell containers
    pub group_by: GroupBy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::New,
            library_name: LibraryName::default(),
            row_count: 1,
            col_count: 1,
            row_height: 56.0,
            cell_width: 200.0,
            row_padding: 16.0,
            col_gap: 16.0,
            cell_style_name: DEFAULT_CELL_STYLE.to_string(),
            cell_symbol_name: DEFAULT_CELL_CONTENT_SYMBOL.to_string(),
            group_by: GroupBy::Row,
        }
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawOptions::deserialize(deserializer)?;
        normalize(&raw)
            .and_then(validate)
            .map_err(serde::de::Error::custom)
    }
}

impl Options {
    /// Parse, default and validate in one step
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        validate(normalize(&RawOptions::from_json(input)?)?)
    }

    /// Read options persisted as metadata
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        validate(normalize(&RawOptions::from_value(value.clone())?)?)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn rows(&self) -> usize {
        self.row_count.max(0) as usize
    }

    pub fn cols(&self) -> usize {
        self.col_count.max(0) as usize
    }

    /// Horizontal distance between the left edges of adjacent cells
    pub fn pitch(&self) -> f64 {
        self.cell_width + self.col_gap
    }

    /// Width of the header band and of every row background
    pub fn band_width(&self) -> f64 {
        self.col_count as f64 * self.pitch() - self.col_gap + 2.0 * self.row_padding
    }

    /// Number of group items along the grouping axis
    pub fn axis_len(&self) -> usize {
        match self.group_by {
            GroupBy::Row => self.rows(),
            GroupBy::Column => self.cols(),
        }
    }

    /// Number of cells inside each group item
    pub fn inner_len(&self) -> usize {
        match self.group_by {
            GroupBy::Row => self.cols(),
            GroupBy::Column => self.rows(),
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

fn coerce_number(field: &str, value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::field(field, "is not a number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::field(field, format!("'{}' is not a number", s))),
        _ => Err(ValidationError::field(field, "is not a number")),
    }
}

fn coerce_count(field: &str, value: &Value) -> Result<i64, ValidationError> {
    let n = coerce_number(field, value)?;
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(ValidationError::field(field, "must be a whole number"));
    }
    // `as` saturates, validate() applies the real bound
    Ok(n as i64)
}

fn coerce_bool(field: &str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ValidationError::field(field, "is not a boolean")),
        },
        _ => Err(ValidationError::field(field, "is not a boolean")),
    }
}

fn coerce_string(field: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(ValidationError::field(field, "is not a string")),
    }
}

fn coerce_enum<T: FromStr<Err = ValidationError>>(
    field: &str,
    value: &Value,
) -> Result<T, ValidationError> {
    coerce_string(field, value)?.parse()
}

/// Fill every omitted field from the built-in default record
pub fn normalize(raw: &RawOptions) -> Result<Options, ValidationError> {
    normalize_with(raw, &Options::default())
}

/// Fill every omitted field from `defaults`
///
/// Values are coerced to their field types; range checks are left to
/// [`validate`]. Unknown fields are ignored.
pub fn normalize_with(raw: &RawOptions, defaults: &Options) -> Result<Options, ValidationError> {
    let fields = raw.present_fields();
    let mut options = defaults.clone();

    for (&field, &value) in &fields {
        match field {
            "mode" => options.mode = coerce_enum(field, value)?,
            "libraryName" => options.library_name = LibraryName::from_value(value)?,
            "rowCount" => options.row_count = coerce_count(field, value)?,
            "colCount" => options.col_count = coerce_count(field, value)?,
            "rowHeight" => options.row_height = coerce_number(field, value)?,
            "cellWidth" => options.cell_width = coerce_number(field, value)?,
            "rowPadding" => options.row_padding = coerce_number(field, value)?,
            "colGap" => options.col_gap = coerce_number(field, value)?,
            "cellStyleName" => options.cell_style_name = coerce_string(field, value)?,
            "cellSymbolName" => options.cell_symbol_name = coerce_string(field, value)?,
            "groupBy" => options.group_by = coerce_enum(field, value)?,
            "groupByColumn" => {
                if !fields.contains_key("groupBy") {
                    options.group_by = if coerce_bool(field, value)? {
                        GroupBy::Column
                    } else {
                        GroupBy::Row
                    };
                }
            }
            other => debug!(field = other, "ignoring unknown option field"),
        }
    }

    Ok(options)
}

fn check_count(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 1 {
        Err(ValidationError::field(field, "must be at least 1"))
    } else if value > MAX_COUNT {
        Err(ValidationError::field(field, format!("must be at most {}", MAX_COUNT)))
    } else {
        Ok(())
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::field(field, "must be greater than 0"))
    }
}

fn check_spacing(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::field(field, "must not be negative"))
    }
}

fn check_name(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::field(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Reject out-of-range options
pub fn validate(options: Options) -> Result<Options, ValidationError> {
    check_count("rowCount", options.row_count)?;
    check_count("colCount", options.col_count)?;
    check_positive("rowHeight", options.row_height)?;
    check_positive("cellWidth", options.cell_width)?;
    check_spacing("rowPadding", options.row_padding)?;
    check_spacing("colGap", options.col_gap)?;
    check_name("cellStyleName", &options.cell_style_name)?;
    check_name("cellSymbolName", &options.cell_symbol_name)?;
    if let LibraryName::Contains(needle) = &options.library_name {
        check_name("libraryName", needle)?;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> RawOptions {
        RawOptions::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_map_yields_defaults() {
        let options = validate(normalize(&RawOptions::new()).unwrap()).unwrap();
        assert_eq!(options, Options::default());
        assert!(options.library_name.matches("design-system v3"));
        assert!(!options.library_name.matches("my design-system"));
    }

    #[test]
    fn test_string_numbers_are_coerced() {
        let options = normalize(&raw(json!({
            "rowCount": "4",
            "colCount": " 3 ",
            "rowHeight": "48.5",
            "colGap": 8
        })))
        .unwrap();
        assert_eq!(options.row_count, 4);
        assert_eq!(options.col_count, 3);
        assert_eq!(options.row_height, 48.5);
        assert_eq!(options.col_gap, 8.0);
        assert_eq!(options.cell_width, 200.0);
    }

    #[test]
    fn test_blank_fields_fall_back_to_defaults() {
        let options = normalize(&raw(json!({"rowHeight": "", "cellWidth": null}))).unwrap();
        assert_eq!(options.row_height, 56.0);
        assert_eq!(options.cell_width, 200.0);
    }

    #[test]
    fn test_legacy_fields() {
        let options = normalize(&raw(json!({"colWidth": 120, "groupByColumn": true}))).unwrap();
        assert_eq!(options.cell_width, 120.0);
        assert_eq!(options.group_by, GroupBy::Column);

        let options = normalize(&raw(json!({"groupBy": "row", "groupByColumn": true}))).unwrap();
        assert_eq!(options.group_by, GroupBy::Row);
    }

    #[test]
    fn test_unknown_enum_values() {
        let err = normalize(&raw(json!({"groupBy": "diagonal"}))).unwrap_err();
        assert_eq!(err, ValidationError::unknown("groupBy", "diagonal"));

        let err = normalize(&raw(json!({"mode": "replace"}))).unwrap_err();
        assert_eq!(err, ValidationError::unknown("mode", "replace"));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = normalize(&raw(json!({"rowHeight": "tall"}))).unwrap_err();
        assert!(err.to_string().contains("rowHeight"));
    }

    #[test]
    fn test_fractional_count() {
        let err = normalize(&raw(json!({"rowCount": "2.5"}))).unwrap_err();
        assert_eq!(err, ValidationError::field("rowCount", "must be a whole number"));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let cases = [
            json!({"rowCount": 0}),
            json!({"colCount": -2}),
            json!({"rowHeight": 0}),
            json!({"cellWidth": "-10"}),
            json!({"rowPadding": -1}),
            json!({"colGap": -0.5}),
            json!({"cellStyleName": "  "}),
            json!({"rowCount": 5000}),
        ];
        for case in cases {
            let options = normalize(&raw(case.clone())).unwrap();
            assert!(validate(options).is_err(), "expected {} to be rejected", case);
        }
    }

    #[test]
    fn test_validate_accepts_zero_spacing() {
        let options = normalize(&raw(json!({"rowPadding": 0, "colGap": "0"}))).unwrap();
        assert!(validate(options).is_ok());
    }

    #[test]
    fn test_double_encoded_payload() {
        let encoded = serde_json::to_string(&json!({"rowCount": "3"}).to_string()).unwrap();
        let options = normalize(&RawOptions::from_json(&encoded).unwrap()).unwrap();
        assert_eq!(options.row_count, 3);
    }

    #[test]
    fn test_library_name_forms() {
        let contains = LibraryName::from_value(&json!("design-system")).unwrap();
        assert_eq!(contains, LibraryName::contains("design-system"));

        let slashed = LibraryName::from_value(&json!("/^ds-/")).unwrap();
        assert!(slashed.matches("ds-core"));
        assert!(!slashed.matches("core ds-"));

        let object = LibraryName::from_value(&json!({"pattern": "kit$"})).unwrap();
        assert!(object.matches("ui kit"));

        let lost = LibraryName::from_value(&json!({})).unwrap();
        assert_eq!(lost, LibraryName::default());

        assert!(LibraryName::from_value(&json!({"pattern": "("})).is_err());
    }

    #[test]
    fn test_persisted_shape() {
        let options = Options {
            row_count: 2,
            col_count: 3,
            group_by: GroupBy::Column,
            ..Default::default()
        };
        let value = options.to_value();
        assert_eq!(value["rowCount"], json!(2));
        assert_eq!(value["groupBy"], json!("column"));
        assert_eq!(value["libraryName"], json!({"pattern": "^design-system"}));
        assert_eq!(Options::from_value(&value).unwrap(), options);
    }

    #[test]
    fn test_band_width() {
        let options = Options {
            row_count: 2,
            col_count: 3,
            cell_width: 200.0,
            col_gap: 16.0,
            row_padding: 16.0,
            row_height: 56.0,
            ..Default::default()
        };
        assert_eq!(options.pitch(), 216.0);
        assert_eq!(options.band_width(), 664.0);
        assert_eq!(options.axis_len(), 2);
        assert_eq!(options.inner_len(), 3);
    }
}
