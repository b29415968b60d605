//! Tests for the table layout planner

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::frame::Frame;
use super::node::{NodeKind, OverrideValue};
use super::planner::{cell_label, plan_table, TablePlan};
use crate::core::options::{GroupBy, Options};
use crate::library::{resolve_all, BindTarget, Libraries, LibraryCatalog, ResolvedHandles};

fn handles(options: &Options) -> ResolvedHandles {
    block_on(resolve_all(
        &Libraries::standard(),
        options,
        &LibraryCatalog::default(),
    ))
    .unwrap()
}

fn example_options(group_by: GroupBy) -> Options {
    Options {
        row_count: 2,
        col_count: 3,
        cell_width: 200.0,
        col_gap: 16.0,
        row_padding: 16.0,
        row_height: 56.0,
        group_by,
        ..Default::default()
    }
}

fn plan(options: &Options) -> TablePlan {
    plan_table(options, &handles(options))
}

#[test]
fn test_worked_example_geometry() {
    let options = example_options(GroupBy::Row);
    let plan = plan(&options);

    let header_row = plan.nodes_of_kind(NodeKind::HeaderRow).next().unwrap();
    assert_eq!(header_row.frame, Frame::new(-16.0, 0.0, 664.0, 56.0));

    let cell = plan.cell(1, 2).unwrap();
    assert_eq!(cell.frame.x, 432.0);
    assert_eq!(cell.frame.width, 200.0);
    assert_eq!(cell.text(), Some("Cell 2:3"));
}

#[test]
fn test_header_labels() {
    let options = example_options(GroupBy::Row);
    let plan = plan(&options);

    for col in 0..3 {
        let label = plan.header_label(col).unwrap();
        assert_eq!(label.frame.x, col as f64 * 216.0);
        // 24 high inside the 56 high band
        assert_eq!(label.frame.y, 16.0);
        assert_eq!(label.text(), Some(format!("Header {}", col + 1).as_str()));
    }
    assert_eq!(plan.count(NodeKind::HeaderLabel), 3);
}

#[test]
fn test_row_bands() {
    let options = example_options(GroupBy::Row);
    let plan = plan(&options);
    let rows: Vec<_> = plan.nodes_of_kind(NodeKind::Row).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].frame, Frame::new(-16.0, 56.0, 664.0, 56.0));
    assert_eq!(rows[1].frame, Frame::new(-16.0, 112.0, 664.0, 56.0));
}

#[test]
fn test_row_style_parity() {
    let options = Options {
        row_count: 5,
        ..example_options(GroupBy::Row)
    };
    let handles = handles(&options);
    let plan = plan_table(&options, &handles);

    for (index, row) in plan.nodes_of_kind(NodeKind::Row).enumerate() {
        let expected = if index % 2 == 0 {
            &handles.odd_row_style
        } else {
            &handles.even_row_style
        };
        assert_eq!(
            row.binding(BindTarget::BackgroundStyle),
            Some(&OverrideValue::Style(expected.id.clone())),
            "row {}",
            index
        );
    }
}

#[test]
fn test_cell_vertical_centering() {
    let options = example_options(GroupBy::Column);
    let plan = plan(&options);
    // 40 high cells inside the 56 high band of row 1 (y = 112)
    assert_eq!(plan.cell(1, 0).unwrap().frame.y, 120.0);
    assert_eq!(plan.cell(0, 0).unwrap().frame.y, 64.0);
}

#[test]
fn test_counts_independent_of_grouping() {
    for group_by in [GroupBy::Row, GroupBy::Column] {
        let options = Options {
            row_count: 4,
            col_count: 7,
            group_by,
            ..Default::default()
        };
        let plan = plan(&options);
        assert_eq!(plan.count(NodeKind::Row), 4);
        assert_eq!(plan.count(NodeKind::Cell), 28);
        assert_eq!(plan.count(NodeKind::HeaderLabel), 7);
        assert_eq!(plan.count(NodeKind::GroupItem), options.axis_len());
        assert_eq!(plan.count(NodeKind::CellsGroup), options.axis_len());
    }
}

#[test]
fn test_grouping_swap_only_changes_membership() {
    let by_row = plan(&example_options(GroupBy::Row));
    let by_col = plan(&example_options(GroupBy::Column));

    for row in 0..2 {
        for col in 0..3 {
            let a = by_row.cell(row, col).unwrap();
            let b = by_col.cell(row, col).unwrap();
            assert_eq!(a.frame, b.frame);
            assert_eq!(a.bindings, b.bindings);
            assert_eq!(a.text(), Some(cell_label(row, col).as_str()));

            let item_a = by_row.parent_of(by_row.parent_of(a.id).unwrap().id).unwrap();
            let item_b = by_col.parent_of(by_col.parent_of(b.id).unwrap().id).unwrap();
            assert_eq!(item_a.name, format!("Row {}", row + 1));
            assert_eq!(item_b.name, format!("Col {}", col + 1));
        }
    }
}

#[test]
fn test_row_grouping_tree() {
    let plan = plan(&example_options(GroupBy::Row));
    let root = plan.root();
    let names: Vec<_> = root.children.iter().map(|&c| plan.node(c).name.as_str()).collect();
    assert_eq!(names, vec!["Header", "Rows"]);

    let item = plan.nodes_of_kind(NodeKind::GroupItem).nth(1).unwrap();
    assert_eq!(item.name, "Row 2");
    assert_eq!(item.metadata.get("type"), Some(&json!("table:row")));
    assert_eq!(item.metadata.get("id"), Some(&json!(1)));

    let kinds: Vec<_> = item.children.iter().map(|&c| plan.node(c).kind).collect();
    assert_eq!(kinds, vec![NodeKind::Row, NodeKind::CellsGroup]);
    assert!(plan.nodes.iter().all(|n| !n.locked));
}

#[test]
fn test_column_grouping_tree() {
    let plan = plan(&example_options(GroupBy::Column));
    let root = plan.root();
    let children: Vec<_> = root.children.iter().map(|&c| plan.node(c)).collect();
    assert_eq!(children.len(), 3);
    assert_eq!(children[1].name, "Rows");
    assert!(children[1].locked);
    assert_eq!(children[2].name, "Cols");
    assert!(!children[2].locked);

    // Every row background lives in the locked layer
    for row in plan.nodes_of_kind(NodeKind::Row) {
        assert_eq!(row.parent, Some(children[1].id));
    }

    let item = plan.nodes_of_kind(NodeKind::GroupItem).nth(2).unwrap();
    assert_eq!(item.name, "Col 3");
    assert_eq!(item.metadata.get("type"), Some(&json!("table:col")));
    assert_eq!(item.metadata.get("id"), Some(&json!(2)));
}

#[test]
fn test_fitted_frames() {
    let plan = plan(&example_options(GroupBy::Row));

    assert_eq!(plan.root().frame, Frame::new(-16.0, 0.0, 664.0, 168.0));

    let cells = plan.nodes_of_kind(NodeKind::CellsGroup).next().unwrap();
    assert_eq!(cells.frame, Frame::new(0.0, 64.0, 632.0, 40.0));

    let item = plan.nodes_of_kind(NodeKind::GroupItem).next().unwrap();
    assert_eq!(item.frame, Frame::new(-16.0, 56.0, 664.0, 56.0));
}

#[test]
fn test_fit_order_is_bottom_up() {
    let plan = plan(&example_options(GroupBy::Column));
    let position = |id| plan.fit_order.iter().position(|&f| f == id).unwrap();

    assert_eq!(plan.fit_order.last(), Some(&plan.root));
    for node in plan.nodes.iter().filter(|n| n.kind.is_group()) {
        for &child in &node.children {
            if plan.node(child).kind.is_group() {
                assert!(
                    position(child) < position(node.id),
                    "{} fitted before {}",
                    node.name,
                    plan.node(child).name
                );
            }
        }
    }
    assert_eq!(plan.fit_order.len(), plan.nodes.iter().filter(|n| n.kind.is_group()).count());
}

#[test]
fn test_cell_bindings() {
    let options = example_options(GroupBy::Row);
    let handles = handles(&options);
    let plan = plan_table(&options, &handles);
    let cell = plan.cell(0, 0).unwrap();

    assert_eq!(
        cell.binding(BindTarget::ContentSymbol),
        Some(&OverrideValue::Symbol(handles.cell_content_symbol.id.clone()))
    );
    assert_eq!(
        cell.binding(BindTarget::CellStyle),
        Some(&OverrideValue::Style(handles.cell_style.id.clone()))
    );
}

#[test]
fn test_single_cell_without_spacing() {
    let options = Options {
        row_padding: 0.0,
        col_gap: 0.0,
        cell_width: 120.0,
        ..Default::default()
    };
    let plan = plan(&options);
    let header_row = plan.nodes_of_kind(NodeKind::HeaderRow).next().unwrap();
    assert_eq!(header_row.frame.width, 120.0);
    assert_eq!(header_row.frame.x, 0.0);
    assert_eq!(plan.count(NodeKind::Cell), 1);
}

#[test]
fn test_plan_is_deterministic() {
    let options = example_options(GroupBy::Column);
    assert_eq!(plan(&options), plan(&options));
}

#[test]
fn test_outline() {
    let plan = plan(&Options::default());
    let outline = plan.outline();
    assert!(outline.starts_with("Table [TableRoot]"));
    assert!(outline.contains("  Header [HeaderGroup]"));
    assert!(outline.contains("\"Cell 1:1\""));
}
