//! Regenerating an existing table
//!
//! An edit rebuilds the whole tree under the table's root node, so the root
//! keeps its identity and its position on the canvas. Cell overrides and
//! header texts the user changed by hand are carried over by their table
//! coordinates as long as those coordinates still exist in the new shape.

use fxhash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use super::builder::{materialize, persist_options, BuildContext, BuildOutput};
use super::layout::{
    cell_bindings, header_label, plan_table, Binding, CellCoord, NodeKind, OverrideValue, PlanId,
    TablePlan,
};
use super::options::{normalize_with, validate, Mode, Options, RawOptions};
use crate::data::constants::{
    COL_GROUP_TAG, META_ID, META_OPTIONS, META_TYPE, ROW_GROUP_TAG, TABLE_TAG,
};
use crate::host::{HostDocument, NodeId};
use crate::library::{resolve_all, BindTarget, LibraryResolver, ResolvedHandles};
use crate::utils::error::{TableError, TableResult};
use crate::utils::message::updated_message;

/// How many manual edits survived a regeneration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditReport {
    pub kept: usize,
    pub discarded: usize,
}

/// Overrides changed by hand, by table coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualEdits {
    /// Cell overrides that differ from their generated values
    pub cells: FxHashMap<CellCoord, Vec<Binding>>,
    pub headers: FxHashMap<usize, String>,
}

impl ManualEdits {
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum::<usize>() + self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only text edits
    pub fn text_only(mut self) -> Self {
        self.cells.retain(|_, bindings| {
            bindings.retain(|b| b.target == BindTarget::Text);
            !bindings.is_empty()
        });
        self
    }
}

/// Whether `node` is the root of a generated table
pub fn is_table<D: HostDocument>(document: &D, node: NodeId) -> bool {
    document
        .get_metadata(node, META_TYPE)
        .as_ref()
        .and_then(Value::as_str)
        == Some(TABLE_TAG)
}

/// The table `node` belongs to, if any
pub fn find_table<D: HostDocument>(document: &D, node: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(id) = current {
        if is_table(document, id) {
            return Some(id);
        }
        current = document.parent(id);
    }
    None
}

/// Options persisted on a table root
pub fn stored_options<D: HostDocument>(document: &D, root: NodeId) -> TableResult<Options> {
    if !is_table(document, root) {
        return Err(TableError::NotATable(root));
    }
    let value = document
        .get_metadata(root, META_OPTIONS)
        .ok_or_else(|| TableError::metadata(format!("table {} has no stored options", root)))?;
    Ok(Options::from_value(&value)?)
}

/// Options for regenerating `root`
///
/// Fields missing from `fields` keep the values stored on the table.
pub fn edit_options<D: HostDocument>(
    document: &D,
    root: NodeId,
    fields: &RawOptions,
) -> TableResult<Options> {
    let stored = stored_options(document, root)?;
    let base = Options {
        mode: Mode::Edit,
        ..stored
    };
    Ok(validate(normalize_with(fields, &base)?)?)
}

fn text_of<D: HostDocument>(document: &D, node: NodeId, point: Option<&str>) -> Option<String> {
    let value = document.get_override(node, point?)?;
    value.as_text().map(str::to_string)
}

fn child_of_kind<D: HostDocument>(document: &D, node: NodeId, kind: NodeKind) -> Option<NodeId> {
    document
        .children(node)
        .into_iter()
        .find(|&c| document.kind(c) == Some(kind))
}

/// Overrides of one cell that differ from what the planner generated
fn changed_bindings<D: HostDocument>(
    document: &D,
    cell: NodeId,
    coord: CellCoord,
    handles: &ResolvedHandles,
) -> Vec<Binding> {
    cell_bindings(handles, coord.row, coord.col)
        .into_iter()
        .filter_map(|planned| {
            let point = handles.cell_symbol.bindings.get(planned.target)?;
            let current = document.get_override(cell, point)?;
            (current != planned.value).then_some(Binding {
                target: planned.target,
                value: current,
            })
        })
        .collect()
}

/// Collect the overrides under `root` that differ from their generated values
///
/// `handles` must be the handles the table was built with.
pub fn harvest_edits<D: HostDocument>(
    document: &D,
    root: NodeId,
    handles: &ResolvedHandles,
) -> ManualEdits {
    let label_point = handles.header_label_symbol.bindings.get(BindTarget::Text);
    let mut edits = ManualEdits::default();

    let mut stack = document.children(root);
    while let Some(node) = stack.pop() {
        match document.kind(node) {
            Some(NodeKind::HeaderGroup) => {
                let labels = document
                    .children(node)
                    .into_iter()
                    .filter(|&c| document.kind(c) == Some(NodeKind::HeaderLabel));
                for (col, label) in labels.enumerate() {
                    if let Some(text) = text_of(document, label, label_point) {
                        if text != header_label(col) {
                            edits.headers.insert(col, text);
                        }
                    }
                }
            }
            Some(NodeKind::GroupItem) => {
                let tag = document.get_metadata(node, META_TYPE);
                let index = document.get_metadata(node, META_ID).and_then(|v| v.as_u64());
                let (Some(tag), Some(index)) = (tag, index) else {
                    debug!(node = %node, "group item without coordinates");
                    continue;
                };
                let Some(cells) = child_of_kind(document, node, NodeKind::CellsGroup) else {
                    continue;
                };
                for (inner, cell) in document.children(cells).into_iter().enumerate() {
                    let coord = match tag.as_str() {
                        Some(ROW_GROUP_TAG) => CellCoord {
                            row: index as usize,
                            col: inner,
                        },
                        Some(COL_GROUP_TAG) => CellCoord {
                            row: inner,
                            col: index as usize,
                        },
                        _ => break,
                    };
                    let changed = changed_bindings(document, cell, coord, handles);
                    if !changed.is_empty() {
                        edits.cells.insert(coord, changed);
                    }
                }
            }
            Some(kind) if kind.is_group() => stack.extend(document.children(node)),
            _ => {}
        }
    }
    edits
}

/// Write harvested overrides back onto a freshly materialized plan
fn reapply_edits<D: HostDocument>(
    document: &mut D,
    plan: &TablePlan,
    node_of: impl Fn(PlanId) -> NodeId,
    handles: &ResolvedHandles,
    edits: &ManualEdits,
) -> TableResult<EditReport> {
    let mut report = EditReport::default();
    let cells: FxHashMap<CellCoord, PlanId> = plan
        .nodes
        .iter()
        .filter_map(|n| n.cell.map(|coord| (coord, n.id)))
        .collect();
    let headers: FxHashMap<usize, PlanId> = plan
        .nodes
        .iter()
        .filter_map(|n| n.header_column.map(|col| (col, n.id)))
        .collect();

    let cell_points = &handles.cell_symbol.bindings;
    for (coord, bindings) in &edits.cells {
        let Some(&id) = cells.get(coord) else {
            report.discarded += bindings.len();
            continue;
        };
        for binding in bindings {
            match cell_points.get(binding.target) {
                Some(point) => {
                    document.set_override(node_of(id), point, binding.value.clone())?;
                    report.kept += 1;
                }
                None => report.discarded += 1,
            }
        }
    }

    let label_point = handles.header_label_symbol.bindings.get(BindTarget::Text);
    for (col, text) in &edits.headers {
        match (headers.get(col), label_point) {
            (Some(&id), Some(point)) => {
                document.set_override(node_of(id), point, OverrideValue::Text(text.clone()))?;
                report.kept += 1;
            }
            _ => report.discarded += 1,
        }
    }
    Ok(report)
}

/// Regenerate the table rooted at `target` with new options
pub async fn edit_table<R, D>(
    resolver: &R,
    document: &mut D,
    target: NodeId,
    options: &Options,
    ctx: &BuildContext,
) -> TableResult<BuildOutput>
where
    R: LibraryResolver,
    D: HostDocument,
{
    let span = info_span!(
        "edit_table",
        root = %target,
        rows = options.row_count,
        cols = options.col_count
    );
    async move {
        let options = validate(Options {
            mode: Mode::Edit,
            ..options.clone()
        })?;
        let previous = stored_options(document, target)?;
        let (handles, built_with) = futures::join!(
            resolve_all(resolver, &options, &ctx.catalog),
            resolve_all(resolver, &previous, &ctx.catalog),
        );
        let handles = handles?;

        let edits = match built_with {
            Ok(built_with) => harvest_edits(document, target, &built_with),
            Err(e) => {
                // Generated styles cannot be told apart from manual ones
                warn!(error = %e, "previous dependencies unavailable, keeping manual text only");
                harvest_edits(document, target, &handles).text_only()
            }
        };
        let origin = document.frame(target)?;
        let removed = document.remove_children(target)?;
        debug!(removed, edits = edits.len(), "cleared previous table");

        let plan = plan_table(&options, &handles);
        let built = materialize(document, &plan, &handles, Some(target))?;
        let fitted = document.frame(target)?;
        document.set_frame(target, fitted.moved_to(origin.x, origin.y))?;

        let report = reapply_edits(document, &plan, |id| built.node(id), &handles, &edits)?;
        if report.discarded > 0 {
            warn!(
                discarded = report.discarded,
                "manual edits outside the new table were dropped"
            );
        }

        persist_options(document, target, &options)?;
        document.set_selection(&[target]);
        document.center_on(target);

        let message = updated_message(options.rows(), options.cols(), ctx.locale);
        info!(
            root = %target,
            from = %format!("{}x{}", previous.row_count, previous.col_count),
            to = %format!("{}x{}", options.row_count, options.col_count),
            kept = report.kept,
            "table updated"
        );

        Ok(BuildOutput {
            root: target,
            mode: Mode::Edit,
            options,
            message,
            created: built.created,
            warnings: built.warnings,
            edits: Some(report),
        })
    }
    .instrument(span)
    .await
}
