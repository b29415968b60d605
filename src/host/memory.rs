//! In-memory host document

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HostDocument, NodeId, NodeSpec};
use crate::core::layout::{Frame, NodeKind, OverrideValue};
use crate::utils::error::{TableError, TableResult};

/// A node stored by [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryNode {
    pub id: NodeId,
    /// `None` for layers the table generator did not create
    #[serde(default)]
    pub kind: Option<NodeKind>,
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Frame relative to the parent
    pub frame: Frame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub overrides: IndexMap<String, OverrideValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, Value>,
}

/// Arena-backed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDocument {
    #[serde(default)]
    nodes: Vec<Option<MemoryNode>>,
    #[serde(default)]
    selection: Vec<NodeId>,
    #[serde(default)]
    viewport_center: Option<(f64, f64)>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> TableResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| TableError::Config(format!("invalid document file: {}", e)))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Add a plain layer at the top level
    pub fn add_layer(&mut self, name: &str, frame: Frame) -> NodeId {
        self.insert(None, None, name.to_string(), frame, None, false)
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        kind: Option<NodeKind>,
        name: String,
        frame: Frame,
        symbol: Option<String>,
        locked: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Some(MemoryNode {
            id,
            kind,
            name,
            parent,
            children: Vec::new(),
            frame,
            symbol,
            locked,
            overrides: IndexMap::new(),
            metadata: IndexMap::new(),
        }));
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    fn expect_node(&self, id: NodeId) -> TableResult<&MemoryNode> {
        self.node(id).ok_or(TableError::UnknownNode(id))
    }

    fn expect_node_mut(&mut self, id: NodeId) -> TableResult<&mut MemoryNode> {
        self.node_mut(id).ok_or(TableError::UnknownNode(id))
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MemoryNode> {
        self.nodes.iter().flatten()
    }

    pub fn top_level(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.parent.is_none()).map(|n| n.id).collect()
    }

    /// All descendants of `id`, depth first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Frame in canvas coordinates
    pub fn absolute_frame(&self, id: NodeId) -> Option<Frame> {
        let node = self.node(id)?;
        let mut frame = node.frame;
        let mut parent = node.parent;
        while let Some(p) = parent {
            let p = self.node(p)?;
            frame = frame.translated(p.frame.x, p.frame.y);
            parent = p.parent;
        }
        Some(frame)
    }

    pub fn viewport_center(&self) -> Option<(f64, f64)> {
        self.viewport_center
    }
}

impl HostDocument for MemoryDocument {
    fn create_node(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> TableResult<NodeId> {
        if let Some(parent) = parent {
            self.expect_node(parent)?;
        }
        Ok(self.insert(parent, Some(spec.kind), spec.name, spec.frame, spec.symbol, spec.locked))
    }

    fn frame(&self, node: NodeId) -> TableResult<Frame> {
        Ok(self.expect_node(node)?.frame)
    }

    fn set_frame(&mut self, node: NodeId, frame: Frame) -> TableResult<()> {
        self.expect_node_mut(node)?.frame = frame;
        Ok(())
    }

    fn set_locked(&mut self, node: NodeId, locked: bool) -> TableResult<()> {
        self.expect_node_mut(node)?.locked = locked;
        Ok(())
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).and_then(|n| n.kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn remove_children(&mut self, node: NodeId) -> TableResult<usize> {
        self.expect_node(node)?;
        let removed = self.descendants(node);
        for id in &removed {
            self.nodes[id.0 as usize] = None;
        }
        self.expect_node_mut(node)?.children.clear();
        self.selection.retain(|id| !removed.contains(id));
        Ok(removed.len())
    }

    fn set_override(
        &mut self,
        node: NodeId,
        override_id: &str,
        value: OverrideValue,
    ) -> TableResult<()> {
        self.expect_node_mut(node)?
            .overrides
            .insert(override_id.to_string(), value);
        Ok(())
    }

    fn get_override(&self, node: NodeId, override_id: &str) -> Option<OverrideValue> {
        self.node(node)?.overrides.get(override_id).cloned()
    }

    fn fit_to_children(&mut self, node: NodeId) -> TableResult<Frame> {
        let group = self.expect_node(node)?;
        let frames: Vec<Frame> = group
            .children
            .iter()
            .filter_map(|&c| self.node(c).map(|n| n.frame))
            .collect();
        let current = group.frame;
        let Some(bounds) = Frame::bounding(&frames) else {
            return Ok(current);
        };

        let fitted = Frame::new(
            current.x + bounds.x,
            current.y + bounds.y,
            bounds.width,
            bounds.height,
        );
        for child in self.children(node) {
            if let Some(child) = self.node_mut(child) {
                child.frame = child.frame.translated(-bounds.x, -bounds.y);
            }
        }
        self.expect_node_mut(node)?.frame = fitted;
        Ok(fitted)
    }

    fn set_metadata(&mut self, node: NodeId, key: &str, value: Value) -> TableResult<()> {
        self.expect_node_mut(node)?.metadata.insert(key.to_string(), value);
        Ok(())
    }

    fn get_metadata(&self, node: NodeId, key: &str) -> Option<Value> {
        self.node(node)?.metadata.get(key).cloned()
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn set_selection(&mut self, nodes: &[NodeId]) {
        self.selection = nodes.iter().copied().filter(|&id| self.node(id).is_some()).collect();
    }

    fn selection_frame(&self) -> Option<Frame> {
        self.selection.last().and_then(|&id| self.absolute_frame(id))
    }

    fn center_on(&mut self, node: NodeId) {
        if let Some(f) = self.absolute_frame(node) {
            self.viewport_center = Some((f.x + f.width / 2.0, f.y + f.height / 2.0));
        }
    }
}
