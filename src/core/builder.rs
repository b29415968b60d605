//! Table builder
//!
//! Resolves the library handles, plans the node tree and writes it into a
//! [`HostDocument`]. Every dependency is resolved before the first node is
//! created, so a missing symbol or style leaves the document untouched.

use fxhash::FxHashSet;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, info_span, Instrument};

use super::edit::EditReport;
use super::layout::{plan_table, PlanId, TablePlan};
use super::options::{validate, Mode, Options};
use crate::data::constants::{INSERTION_GAP, META_OPTIONS, META_TYPE, TABLE_TAG};
use crate::host::{HostDocument, NodeId, NodeSpec};
use crate::library::{
    resolve_all, BindTarget, InstanceRole, LibraryCatalog, LibraryResolver, ResolvedHandles,
};
use crate::utils::error::{BuildWarning, TableResult};
use crate::utils::message::{inserted_message, Locale};

/// Settings shared by every build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildContext {
    pub catalog: LibraryCatalog,
    pub locale: Locale,
}

/// Result of a build or an edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub root: NodeId,
    pub mode: Mode,
    pub options: Options,
    /// Confirmation shown to the user
    pub message: String,
    /// Number of nodes created under and including the root
    pub created: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<BuildWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edits: Option<EditReport>,
}

/// Host nodes written for a plan
#[derive(Debug, Clone)]
pub struct Materialized {
    pub root: NodeId,
    ids: Vec<NodeId>,
    pub created: usize,
    pub warnings: Vec<BuildWarning>,
}

impl Materialized {
    /// Host node of a planned node
    pub fn node(&self, id: PlanId) -> NodeId {
        self.ids[id.0]
    }
}

/// Write `plan` into the document
///
/// With `existing_root`, the tree is rebuilt under that node instead of a new
/// one; the root must have no children. The root ends up fitted to its
/// content in table space, the caller positions it.
pub fn materialize<D: HostDocument>(
    document: &mut D,
    plan: &TablePlan,
    handles: &ResolvedHandles,
    existing_root: Option<NodeId>,
) -> TableResult<Materialized> {
    let mut ids = Vec::with_capacity(plan.len());
    let mut created = 0;
    let mut warnings = Vec::new();
    let mut missing: FxHashSet<(InstanceRole, BindTarget)> = FxHashSet::default();

    for node in &plan.nodes {
        let id = match (node.parent, existing_root) {
            (None, Some(root)) => {
                document.set_frame(root, Default::default())?;
                root
            }
            (parent, _) => {
                // Ancestors sit at the origin until fitted, so table space is local space
                let frame = if node.kind.is_group() {
                    Default::default()
                } else {
                    node.frame
                };
                let spec = NodeSpec {
                    kind: node.kind,
                    name: node.name.clone(),
                    frame,
                    symbol: node.instance.map(|role| handles.instance(role).id.clone()),
                    locked: false,
                };
                created += 1;
                document.create_node(parent.map(|p| ids[p.0]), spec)?
            }
        };
        ids.push(id);

        if let Some(role) = node.instance {
            let symbol = handles.instance(role);
            for binding in &node.bindings {
                match symbol.bindings.get(binding.target) {
                    Some(point) => document.set_override(id, point, binding.value.clone())?,
                    None => {
                        debug!(
                            symbol = %symbol.name,
                            bind = ?binding.target,
                            "no override point, skipping"
                        );
                        if missing.insert((role, binding.target)) {
                            warnings.push(BuildWarning::at(
                                id,
                                format!(
                                    "symbol '{}' has no {:?} override",
                                    symbol.name, binding.target
                                ),
                            ));
                        }
                    }
                }
            }
        }

        for (key, value) in &node.metadata {
            document.set_metadata(id, key, value.clone())?;
        }
    }

    for &group in &plan.fit_order {
        document.fit_to_children(ids[group.0])?;
    }
    for node in plan.nodes.iter().filter(|n| n.locked) {
        document.set_locked(ids[node.id.0], true)?;
    }

    Ok(Materialized {
        root: ids[plan.root.0],
        ids,
        created,
        warnings,
    })
}

/// Tag `root` as a table and persist its options
pub(crate) fn persist_options<D: HostDocument>(
    document: &mut D,
    root: NodeId,
    options: &Options,
) -> TableResult<()> {
    document.set_metadata(root, META_TYPE, json!(TABLE_TAG))?;
    document.set_metadata(root, META_OPTIONS, options.to_value())
}

/// Build a new table next to the current selection
pub async fn build_table<R, D>(
    resolver: &R,
    document: &mut D,
    options: &Options,
    ctx: &BuildContext,
) -> TableResult<BuildOutput>
where
    R: LibraryResolver,
    D: HostDocument,
{
    let span = info_span!("build_table", rows = options.row_count, cols = options.col_count);
    async move {
        let options = validate(Options {
            mode: Mode::New,
            ..options.clone()
        })?;
        let handles = resolve_all(resolver, &options, &ctx.catalog).await?;

        let plan = plan_table(&options, &handles);
        let built = materialize(document, &plan, &handles, None)?;

        let (x, y) = document
            .selection_frame()
            .map(|sel| (sel.right() + INSERTION_GAP, sel.y))
            .unwrap_or((0.0, 0.0));
        let fitted = document.frame(built.root)?;
        document.set_frame(built.root, fitted.moved_to(x, y))?;

        persist_options(document, built.root, &options)?;
        document.set_selection(&[built.root]);
        document.center_on(built.root);

        let message = inserted_message(options.rows(), options.cols(), ctx.locale);
        info!(root = %built.root, nodes = built.created, "table inserted");

        Ok(BuildOutput {
            root: built.root,
            mode: Mode::New,
            options,
            message,
            created: built.created,
            warnings: built.warnings,
            edits: None,
        })
    }
    .instrument(span)
    .await
}
