//! Table layout planner
//!
//! Computes the complete node tree of a table from its options and resolved
//! handles: names, frames in table space, symbol bindings and metadata.
//! Group frames are fitted bottom-up, each once all of its children exist.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use super::frame::Frame;
use super::node::{Binding, CellCoord, NodeKind, OverrideValue, PlanId, PlanNode};
use crate::core::options::{GroupBy, Options};
use crate::data::constants::{COL_GROUP_TAG, META_ID, META_TYPE, ROW_GROUP_TAG};
use crate::library::{BindTarget, InstanceRole, ResolvedHandles};

/// Generated text of the header label in column `col`
pub fn header_label(col: usize) -> String {
    format!("Header {}", col + 1)
}

/// Generated text of the cell at `(row, col)`
pub fn cell_label(row: usize, col: usize) -> String {
    format!("Cell {}:{}", row + 1, col + 1)
}

/// Generated bindings of the cell at `(row, col)`
pub fn cell_bindings(handles: &ResolvedHandles, row: usize, col: usize) -> Vec<Binding> {
    vec![
        Binding {
            target: BindTarget::ContentSymbol,
            value: OverrideValue::Symbol(handles.cell_content_symbol.id.clone()),
        },
        Binding {
            target: BindTarget::CellStyle,
            value: OverrideValue::Style(handles.cell_style.id.clone()),
        },
        Binding {
            target: BindTarget::Text,
            value: OverrideValue::Text(cell_label(row, col)),
        },
    ]
}

/// Planned table: node arena in creation order plus the fit order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePlan {
    pub nodes: Vec<PlanNode>,
    pub root: PlanId,
    /// Groups in the order their frames were fitted
    pub fit_order: Vec<PlanId>,
}

impl TablePlan {
    pub fn node(&self, id: PlanId) -> &PlanNode {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> &PlanNode {
        self.node(self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &PlanNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes_of_kind(kind).count()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&PlanNode> {
        let coord = CellCoord { row, col };
        self.nodes.iter().find(|n| n.cell == Some(coord))
    }

    pub fn header_label(&self, col: usize) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.header_column == Some(col))
    }

    pub fn parent_of(&self, id: PlanId) -> Option<&PlanNode> {
        self.node(id).parent.map(|p| self.node(p))
    }

    /// Indented outline of the tree, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root, 0, &mut out);
        out
    }

    fn write_outline(&self, id: PlanId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let f = node.frame;
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&format!(
            "{} [{:?}] ({}, {}, {}x{})",
            node.name, node.kind, f.x, f.y, f.width, f.height
        ));
        if node.locked {
            out.push_str(" locked");
        }
        if let Some(text) = node.text() {
            out.push_str(&format!(" \"{}\"", text));
        }
        out.push('\n');
        for &child in &node.children {
            self.write_outline(child, depth + 1, out);
        }
    }
}

struct TablePlanner<'a> {
    options: &'a Options,
    handles: &'a ResolvedHandles,
    nodes: Vec<PlanNode>,
    fit_order: Vec<PlanId>,
}

impl<'a> TablePlanner<'a> {
    fn new(options: &'a Options, handles: &'a ResolvedHandles) -> Self {
        TablePlanner {
            options,
            handles,
            nodes: Vec::new(),
            fit_order: Vec::new(),
        }
    }

    fn push(
        &mut self,
        parent: Option<PlanId>,
        kind: NodeKind,
        name: impl Into<String>,
        frame: Frame,
    ) -> PlanId {
        let id = PlanId(self.nodes.len());
        self.nodes.push(PlanNode {
            id,
            kind,
            name: name.into(),
            parent,
            children: Vec::new(),
            frame,
            instance: None,
            bindings: Vec::new(),
            metadata: IndexMap::new(),
            locked: false,
            cell: None,
            header_column: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn group(&mut self, parent: Option<PlanId>, kind: NodeKind, name: impl Into<String>) -> PlanId {
        self.push(parent, kind, name, Frame::default())
    }

    fn instance(
        &mut self,
        parent: PlanId,
        kind: NodeKind,
        role: InstanceRole,
        frame: Frame,
    ) -> PlanId {
        let name = self.handles.instance(role).name.clone();
        let id = self.push(Some(parent), kind, name, frame);
        self.nodes[id.0].instance = Some(role);
        id
    }

    fn bind(&mut self, id: PlanId, target: BindTarget, value: OverrideValue) {
        self.nodes[id.0].bindings.push(Binding { target, value });
    }

    fn fit(&mut self, id: PlanId) {
        let children = &self.nodes[id.0].children;
        let bounds = Frame::bounding(children.iter().map(|c| &self.nodes[c.0].frame));
        if let Some(bounds) = bounds {
            self.nodes[id.0].frame = bounds;
        }
        self.fit_order.push(id);
    }

    /// Frame of the background band of body row `row`
    fn row_band(&self, row: usize) -> Frame {
        let o = self.options;
        Frame::new(
            -o.row_padding,
            (row + 1) as f64 * o.row_height,
            o.band_width(),
            o.row_height,
        )
    }

    fn plan_header(&mut self, root: PlanId) -> PlanId {
        let o = self.options;
        let header = self.group(Some(root), NodeKind::HeaderGroup, "Header");

        let band = Frame::new(-o.row_padding, 0.0, o.band_width(), o.row_height);
        let header_row = self.instance(header, NodeKind::HeaderRow, InstanceRole::Row, band);
        let style = OverrideValue::Style(self.handles.header_row_style.id.clone());
        self.bind(header_row, BindTarget::BackgroundStyle, style);

        let label_height = self.handles.header_label_symbol.height;
        for col in 0..o.cols() {
            let frame = Frame::new(
                col as f64 * o.pitch(),
                band.centered_y(label_height),
                o.cell_width,
                label_height,
            );
            let label =
                self.instance(header, NodeKind::HeaderLabel, InstanceRole::HeaderLabel, frame);
            self.nodes[label.0].header_column = Some(col);
            self.bind(label, BindTarget::Text, OverrideValue::Text(header_label(col)));
        }
        header
    }

    fn plan_row(&mut self, parent: PlanId, row: usize) -> PlanId {
        let band = self.row_band(row);
        let id = self.instance(parent, NodeKind::Row, InstanceRole::Row, band);
        let style = OverrideValue::Style(self.handles.row_style(row).id.clone());
        self.bind(id, BindTarget::BackgroundStyle, style);
        id
    }

    fn plan_cell(&mut self, parent: PlanId, row: usize, col: usize) -> PlanId {
        let o = self.options;
        let height = self.handles.cell_symbol.height;
        let frame = Frame::new(
            col as f64 * o.pitch(),
            self.row_band(row).centered_y(height),
            o.cell_width,
            height,
        );
        let id = self.instance(parent, NodeKind::Cell, InstanceRole::Cell, frame);
        let node = &mut self.nodes[id.0];
        node.cell = Some(CellCoord { row, col });
        node.bindings = cell_bindings(self.handles, row, col);
        id
    }

    /// Plan the grouping containers, returning them in fit order
    fn plan_body(&mut self, root: PlanId) -> Vec<PlanId> {
        let group_by = self.options.group_by;
        let mut containers = Vec::new();

        // Column grouping keeps the row stripes in one locked layer under the cells
        if group_by == GroupBy::Column {
            let backgrounds = self.group(Some(root), NodeKind::RowsOrColsGroup, "Rows");
            self.nodes[backgrounds.0].locked = true;
            for row in 0..self.options.rows() {
                self.plan_row(backgrounds, row);
            }
            containers.push(backgrounds);
        }

        let (container_name, tag) = match group_by {
            GroupBy::Row => ("Rows", ROW_GROUP_TAG),
            GroupBy::Column => ("Cols", COL_GROUP_TAG),
        };
        let container = self.group(Some(root), NodeKind::RowsOrColsGroup, container_name);

        for axis in 0..self.options.axis_len() {
            let item_name = format!("{} {}", group_by.item_prefix(), axis + 1);
            let item = self.group(Some(container), NodeKind::GroupItem, item_name);
            let metadata: IndexMap<String, Value> = [
                (META_TYPE.to_string(), json!(tag)),
                (META_ID.to_string(), json!(axis)),
            ]
            .into_iter()
            .collect();
            self.nodes[item.0].metadata = metadata;

            if group_by == GroupBy::Row {
                self.plan_row(item, axis);
            }

            let cells = self.group(Some(item), NodeKind::CellsGroup, "Cells");
            for inner in 0..self.options.inner_len() {
                let (row, col) = match group_by {
                    GroupBy::Row => (axis, inner),
                    GroupBy::Column => (inner, axis),
                };
                self.plan_cell(cells, row, col);
            }

            self.fit(cells);
            self.fit(item);
        }

        containers.push(container);
        containers
    }

    fn finish(mut self) -> TablePlan {
        let root = self.group(None, NodeKind::TableRoot, "Table");
        let header = self.plan_header(root);
        let containers = self.plan_body(root);

        for container in containers {
            self.fit(container);
        }
        self.fit(header);
        self.fit(root);

        TablePlan {
            nodes: self.nodes,
            root,
            fit_order: self.fit_order,
        }
    }
}

/// Plan the full node tree of a table
///
/// The options must already be validated; the plan is deterministic for a
/// given pair of inputs.
pub fn plan_table(options: &Options, handles: &ResolvedHandles) -> TablePlan {
    TablePlanner::new(options, handles).finish()
}
