//! Planned layout nodes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::frame::Frame;
use crate::library::{BindTarget, InstanceRole};

/// Structural role of a node in a generated table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    TableRoot,
    HeaderGroup,
    HeaderRow,
    HeaderLabel,
    /// Container of the group items, or of the row backgrounds when grouping by column
    RowsOrColsGroup,
    /// One row or one column
    GroupItem,
    CellsGroup,
    /// Row background, one per body row
    Row,
    Cell,
}

impl NodeKind {
    /// Whether the node is a group whose frame is fitted to its children
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            NodeKind::TableRoot
                | NodeKind::HeaderGroup
                | NodeKind::RowsOrColsGroup
                | NodeKind::GroupItem
                | NodeKind::CellsGroup
        )
    }
}

/// Value written to an override point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum OverrideValue {
    Text(String),
    /// Symbol id swapped into a nested slot
    Symbol(String),
    /// Shared layer style id
    Style(String),
}

impl OverrideValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OverrideValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Value bound to a role of the node's symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub target: BindTarget,
    pub value: OverrideValue,
}

/// Index of a node inside a [`TablePlan`](super::TablePlan)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlanId(pub usize);

/// True table coordinates of a cell, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

/// A node of the planned tree, with its frame in table space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanNode {
    pub id: PlanId,
    pub kind: NodeKind,
    pub name: String,
    pub parent: Option<PlanId>,
    pub children: Vec<PlanId>,
    pub frame: Frame,
    /// Symbol this node is an instance of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceRole>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, Value>,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellCoord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_column: Option<usize>,
}

impl PlanNode {
    pub fn binding(&self, target: BindTarget) -> Option<&OverrideValue> {
        self.bindings
            .iter()
            .find(|b| b.target == target)
            .map(|b| &b.value)
    }

    pub fn text(&self) -> Option<&str> {
        self.binding(BindTarget::Text).and_then(OverrideValue::as_text)
    }
}
