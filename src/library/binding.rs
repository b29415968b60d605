//! Typed binding table for symbol override points
//!
//! A symbol exposes override points addressed by the name of the layer they
//! affect. Matching on those layer names happens here, once, when a symbol
//! is resolved; the planner and the builder only ever see [`BindTarget`]s.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Property substituted by an override point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideProperty {
    #[serde(rename = "stringValue")]
    StringValue,
    #[serde(rename = "symbolID")]
    SymbolId,
    #[serde(rename = "layerStyle")]
    LayerStyle,
}

/// One override point exposed by a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePoint {
    pub id: String,
    pub property: OverrideProperty,
    pub layer_name: String,
}

impl OverridePoint {
    pub fn new(
        id: impl Into<String>,
        property: OverrideProperty,
        layer_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            property,
            layer_name: layer_name.into(),
        }
    }
}

/// Role a generated node binds a value to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindTarget {
    /// Text of a header label or a cell
    Text,
    /// Layer style of a row or header band background
    BackgroundStyle,
    /// Nested symbol in a cell's content slot
    ContentSymbol,
    /// Layer style of a cell
    CellStyle,
}

struct BindingRule {
    target: BindTarget,
    property: OverrideProperty,
    layer: Regex,
}

lazy_static! {
    static ref BINDING_RULES: Vec<BindingRule> = vec![
        BindingRule {
            target: BindTarget::Text,
            property: OverrideProperty::StringValue,
            layer: Regex::new("Label").unwrap(),
        },
        BindingRule {
            target: BindTarget::BackgroundStyle,
            property: OverrideProperty::LayerStyle,
            layer: Regex::new("^🎨 Background style$").unwrap(),
        },
        BindingRule {
            target: BindTarget::ContentSymbol,
            property: OverrideProperty::SymbolId,
            layer: Regex::new("Table/Cell Content/Default").unwrap(),
        },
        BindingRule {
            target: BindTarget::CellStyle,
            property: OverrideProperty::LayerStyle,
            layer: Regex::new("^Cell style$").unwrap(),
        },
    ];
}

/// Override point id per bind target for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BindingTable(IndexMap<BindTarget, String>);

impl BindingTable {
    /// Map a symbol's override points to bind targets
    ///
    /// The first matching point wins for each target; targets with no match
    /// are simply absent.
    pub fn from_override_points(points: &[OverridePoint]) -> Self {
        let mut table = IndexMap::new();
        for rule in BINDING_RULES.iter() {
            let found = points
                .iter()
                .find(|p| p.property == rule.property && rule.layer.is_match(&p.layer_name));
            if let Some(point) = found {
                table.insert(rule.target, point.id.clone());
            }
        }
        BindingTable(table)
    }

    pub fn get(&self, target: BindTarget) -> Option<&str> {
        self.0.get(&target).map(String::as_str)
    }

    pub fn contains(&self, target: BindTarget) -> bool {
        self.0.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_points() {
        let points = vec![
            OverridePoint::new("o1", OverrideProperty::SymbolId, "Table/Cell Content/Default/Text"),
            OverridePoint::new("o2", OverrideProperty::LayerStyle, "Cell style"),
            OverridePoint::new("o3", OverrideProperty::StringValue, "Label"),
        ];
        let table = BindingTable::from_override_points(&points);
        assert_eq!(table.get(BindTarget::ContentSymbol), Some("o1"));
        assert_eq!(table.get(BindTarget::CellStyle), Some("o2"));
        assert_eq!(table.get(BindTarget::Text), Some("o3"));
        assert_eq!(table.get(BindTarget::BackgroundStyle), None);
    }

    #[test]
    fn test_property_must_match() {
        let points = vec![OverridePoint::new("o1", OverrideProperty::StringValue, "Cell style")];
        let table = BindingTable::from_override_points(&points);
        assert!(table.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let points = vec![
            OverridePoint::new("a", OverrideProperty::StringValue, "Label"),
            OverridePoint::new("b", OverrideProperty::StringValue, "Sub Label"),
        ];
        let table = BindingTable::from_override_points(&points);
        assert_eq!(table.get(BindTarget::Text), Some("a"));
    }

    #[test]
    fn test_background_is_exact() {
        let points = vec![
            OverridePoint::new("x", OverrideProperty::LayerStyle, "🎨 Background style (old)"),
            OverridePoint::new("y", OverrideProperty::LayerStyle, "🎨 Background style"),
        ];
        let table = BindingTable::from_override_points(&points);
        assert_eq!(table.get(BindTarget::BackgroundStyle), Some("y"));
    }
}
