//! Table Layout Planning
//!
//! A pure planner for the node tree of a generated table: header band and
//! labels, row backgrounds, grouping containers and cells, with frames in
//! table space and typed bindings to the resolved symbols and styles.
//!
//! # Architecture
//!
//! ```text
//! Options + ResolvedHandles -> TablePlanner -> TablePlan -> Builder -> HostDocument
//! ```
//!
//! # Example
//!
//! ```ignore
//! let handles = block_on(resolve_all(&libraries, &options, &catalog))?;
//! let plan = plan_table(&options, &handles);
//! assert_eq!(plan.count(NodeKind::Cell), options.rows() * options.cols());
//! ```

mod frame;
mod node;
mod planner;

#[cfg(test)]
mod tests;

// Re-export public API
pub use frame::Frame;
pub use node::{Binding, CellCoord, NodeKind, OverrideValue, PlanId, PlanNode};
pub use planner::{cell_bindings, cell_label, header_label, plan_table, TablePlan};
