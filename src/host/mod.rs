//! Host document abstraction
//!
//! Generated tables are materialized through the [`HostDocument`] trait,
//! which mirrors the mutation API of the design tool:
//!
//! - `MemoryDocument`: arena-backed document (tests, CLI, WASM previews)
//!
//! Frames passed to and returned by a host are relative to the node's
//! parent. Fitting a group moves the group onto its children's bounding box
//! and shifts the children so their positions on the canvas do not change.

pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::layout::{Frame, NodeKind, OverrideValue};
use crate::utils::error::TableResult;

pub use memory::{MemoryDocument, MemoryNode};

/// Identity of a node in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to create one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub name: String,
    /// Initial frame, relative to the parent
    pub frame: Frame,
    /// Id of the symbol the node is an instance of
    pub symbol: Option<String>,
    pub locked: bool,
}

impl NodeSpec {
    pub fn group(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            frame: Frame::default(),
            symbol: None,
            locked: false,
        }
    }
}

/// Document mutation API used by the builder
pub trait HostDocument {
    /// Create a node under `parent`, or at the top level
    fn create_node(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> TableResult<NodeId>;

    fn frame(&self, node: NodeId) -> TableResult<Frame>;

    fn set_frame(&mut self, node: NodeId, frame: Frame) -> TableResult<()>;

    fn set_locked(&mut self, node: NodeId, locked: bool) -> TableResult<()>;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in creation order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Remove every descendant of `node`, returning how many nodes went away
    fn remove_children(&mut self, node: NodeId) -> TableResult<usize>;

    fn set_override(
        &mut self,
        node: NodeId,
        override_id: &str,
        value: OverrideValue,
    ) -> TableResult<()>;

    fn get_override(&self, node: NodeId, override_id: &str) -> Option<OverrideValue>;

    /// Recompute a group's frame from its children
    fn fit_to_children(&mut self, node: NodeId) -> TableResult<Frame>;

    fn set_metadata(&mut self, node: NodeId, key: &str, value: Value) -> TableResult<()>;

    fn get_metadata(&self, node: NodeId, key: &str) -> Option<Value>;

    /// Currently selected nodes, in selection order
    fn selection(&self) -> Vec<NodeId>;

    fn set_selection(&mut self, nodes: &[NodeId]);

    /// Frame of the trailing selected layer, in canvas coordinates
    fn selection_frame(&self) -> Option<Frame>;

    fn center_on(&mut self, node: NodeId);
}
