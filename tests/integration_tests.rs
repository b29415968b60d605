//! Integration tests for table generation against an in-memory document

use futures::executor::block_on;
use serde_json::json;
use table_generator::{
    build_table, edit_table, normalize_options, preview_table, BuildContext, Command, Config,
    Dispatcher, Frame, GroupBy, HostDocument, Libraries, LibraryCatalog, MemoryDocument,
    MemoryLibrary, Mode, NodeId, NodeKind, Options, Outcome, OverrideValue, RawOptions, TableError,
};

fn options(rows: i64, cols: i64, group_by: GroupBy) -> Options {
    Options {
        row_count: rows,
        col_count: cols,
        group_by,
        ..Default::default()
    }
}

fn build(document: &mut MemoryDocument, options: &Options) -> NodeId {
    block_on(build_table(
        &Libraries::standard(),
        document,
        options,
        &BuildContext::default(),
    ))
    .unwrap()
    .root
}

fn of_kind(document: &MemoryDocument, root: NodeId, kind: NodeKind) -> Vec<NodeId> {
    document
        .descendants(root)
        .into_iter()
        .filter(|&id| document.kind(id) == Some(kind))
        .collect()
}

fn text(document: &MemoryDocument, node: NodeId) -> Option<String> {
    document
        .node(node)?
        .overrides
        .values()
        .find_map(OverrideValue::as_text)
        .map(str::to_string)
}

/// Everything about a table except its node ids and its position
fn shape(document: &MemoryDocument, root: NodeId) -> Vec<serde_json::Value> {
    document
        .descendants(root)
        .into_iter()
        .filter_map(|id| document.node(id))
        .map(|n| {
            json!({
                "name": n.name,
                "kind": n.kind,
                "frame": n.frame,
                "symbol": n.symbol,
                "locked": n.locked,
                "overrides": n.overrides,
                "metadata": n.metadata,
            })
        })
        .collect()
}

// ============================================================================
// Geometry
// ============================================================================

mod geometry {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_worked_example() {
        let mut doc = MemoryDocument::new();
        let root = build(&mut doc, &options(2, 3, GroupBy::Row));

        let header_row = of_kind(&doc, root, NodeKind::HeaderRow)[0];
        assert_eq!(doc.absolute_frame(header_row).unwrap().width, 664.0);

        let origin = doc.absolute_frame(root).unwrap().x + 16.0;
        let cell = of_kind(&doc, root, NodeKind::Cell)[5];
        assert_eq!(text(&doc, cell).as_deref(), Some("Cell 2:3"));
        assert_eq!(doc.absolute_frame(cell).unwrap().x - origin, 432.0);
    }

    #[test]
    fn test_header_width_formula() {
        let layouts = [(1, 120.0, 0.0, 0.0), (4, 80.0, 8.0, 12.0), (7, 200.0, 16.0, 16.0)];
        for (cols, width, gap, padding) in layouts {
            let opts = Options {
                col_count: cols,
                cell_width: width,
                col_gap: gap,
                row_padding: padding,
                ..Default::default()
            };
            let catalog = LibraryCatalog::default();
            let plan = preview_table(&Libraries::standard(), &opts, &catalog).unwrap();
            let header_row = plan.nodes_of_kind(NodeKind::HeaderRow).next().unwrap();
            let expected = cols as f64 * (width + gap) - gap + 2.0 * padding;
            assert_eq!(header_row.frame.width, expected, "{} columns", cols);
            assert_eq!(header_row.frame.x, -padding);

            for col in 0..cols as usize {
                assert_eq!(plan.header_label(col).unwrap().frame.x, col as f64 * (width + gap));
            }
        }
    }

    #[test]
    fn test_counts_independent_of_grouping() {
        for (rows, cols) in [(1, 1), (3, 5), (6, 2)] {
            for group_by in [GroupBy::Row, GroupBy::Column] {
                let mut doc = MemoryDocument::new();
                let root = build(&mut doc, &options(rows, cols, group_by));
                assert_eq!(of_kind(&doc, root, NodeKind::Row).len(), rows as usize);
                assert_eq!(of_kind(&doc, root, NodeKind::Cell).len(), (rows * cols) as usize);
                assert_eq!(of_kind(&doc, root, NodeKind::HeaderLabel).len(), cols as usize);
            }
        }
    }

    #[test]
    fn test_grouping_swap_keeps_cell_geometry() {
        let frames = |group_by| {
            let mut doc = MemoryDocument::new();
            let root = build(&mut doc, &options(3, 2, group_by));
            let mut cells: Vec<(String, Frame)> = of_kind(&doc, root, NodeKind::Cell)
                .into_iter()
                .map(|id| (text(&doc, id).unwrap(), doc.absolute_frame(id).unwrap()))
                .collect();
            cells.sort_by(|a, b| a.0.cmp(&b.0));
            cells
        };
        assert_eq!(frames(GroupBy::Row), frames(GroupBy::Column));
    }

    #[test]
    fn test_row_style_parity() {
        let mut doc = MemoryDocument::new();
        let root = build(&mut doc, &options(4, 1, GroupBy::Column));
        let styles: Vec<_> = of_kind(&doc, root, NodeKind::Row)
            .into_iter()
            .map(|id| doc.get_override(id, "row/background").unwrap())
            .collect();
        let odd = OverrideValue::Style("design-system:style:Table/Row/_Odd (impair)".into());
        let even = OverrideValue::Style("design-system:style:Table/Row/_Even (pair)".into());
        assert_eq!(styles, vec![odd.clone(), even.clone(), odd, even]);

        let header_row = of_kind(&doc, root, NodeKind::HeaderRow)[0];
        assert_eq!(
            doc.get_override(header_row, "row/background"),
            Some(OverrideValue::Style("design-system:style:Table/Row/_Header".into()))
        );
    }

    #[test]
    fn test_idempotent_modulo_offset() {
        let opts = options(3, 3, GroupBy::Column);

        let mut first = MemoryDocument::new();
        let a = build(&mut first, &opts);

        let mut second = MemoryDocument::new();
        let anchor = second.add_layer("Artboard", Frame::new(-250.0, 900.0, 50.0, 50.0));
        second.set_selection(&[anchor]);
        let b = build(&mut second, &opts);

        assert_eq!(shape(&first, a), shape(&second, b));
        let (fa, fb) = (first.frame(a).unwrap(), second.frame(b).unwrap());
        assert_eq!((fa.width, fa.height), (fb.width, fb.height));
        assert_eq!((fb.x, fb.y), (-100.0, 900.0));
    }
}

// ============================================================================
// Library Resolution
// ============================================================================

mod resolution {
    use super::*;
    use pretty_assertions::assert_eq;

    const REQUIRED: [&str; 8] = [
        "Table/Row/Standard",
        "Table/Cell/Default",
        "Table/Header Label/Left/Default",
        "Table/Cell Content/Default/Text",
        "Table/Cell/Default/Transparent",
        "Table/Row/_Odd (impair)",
        "Table/Row/_Even (pair)",
        "Table/Row/_Header",
    ];

    #[test]
    fn test_each_missing_name_creates_nothing() {
        for name in REQUIRED {
            let mut library = MemoryLibrary::standard("design-system");
            assert!(library.remove_symbol(name) || library.remove_style(name), "{}", name);
            let libraries = Libraries::new().with(library);

            let mut doc = MemoryDocument::new();
            let err = block_on(build_table(
                &libraries,
                &mut doc,
                &Options::default(),
                &BuildContext::default(),
            ))
            .unwrap_err();

            match err {
                TableError::MissingDependency { name: missing, .. } => assert_eq!(missing, name),
                other => panic!("unexpected error for {}: {}", name, other),
            }
            assert!(doc.is_empty(), "{} left nodes behind", name);
        }
    }

    #[test]
    fn test_library_pattern_selects_library() {
        let libraries = Libraries::new()
            .with(MemoryLibrary::new("design-system-legacy"))
            .with(MemoryLibrary::standard("brand-kit"));
        let opts = normalize_options(r#"{"libraryName": {"pattern": "^brand"}}"#).unwrap();
        let plan = preview_table(&libraries, &opts, &LibraryCatalog::default()).unwrap();
        assert_eq!(plan.count(NodeKind::Cell), 1);
    }

    #[test]
    fn test_library_from_json() {
        let libraries = Libraries::from_json(
            r#"{ "libraries": [ { "name": "design-system",
                 "symbols": [
                   { "id": "row", "name": "Table/Row/Standard", "width": 600, "height": 56 },
                   { "id": "cell", "name": "Table/Cell/Default", "width": 200, "height": 32 },
                   { "id": "label", "name": "Table/Header Label/Left/Default",
                     "width": 200, "height": 20,
                     "overrides": [
                       { "id": "t", "property": "stringValue", "layerName": "Label" }
                     ] },
                   { "id": "content", "name": "Table/Cell Content/Default/Text",
                     "width": 200, "height": 32 }
                 ],
                 "styles": [
                   { "id": "s1", "name": "Table/Cell/Default/Transparent" },
                   { "id": "s2", "name": "Table/Row/_Odd (impair)" },
                   { "id": "s3", "name": "Table/Row/_Even (pair)" },
                   { "id": "s4", "name": "Table/Row/_Header" }
                 ] } ] }"#,
        )
        .unwrap();

        let mut doc = MemoryDocument::new();
        let ctx = BuildContext::default();
        let out = block_on(build_table(&libraries, &mut doc, &Options::default(), &ctx)).unwrap();
        let label = of_kind(&doc, out.root, NodeKind::HeaderLabel)[0];
        assert_eq!(doc.get_override(label, "t"), Some(OverrideValue::Text("Header 1".into())));
        // Row and cell symbols expose no override points
        assert_eq!(out.warnings.len(), 4);
    }
}

// ============================================================================
// Edit Mode
// ============================================================================

mod edit_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edit_keeps_identity_and_manual_text() {
        let mut doc = MemoryDocument::new();
        let root = build(&mut doc, &options(3, 3, GroupBy::Column));
        let cells = of_kind(&doc, root, NodeKind::Cell);
        let target = cells
            .iter()
            .copied()
            .find(|&id| text(&doc, id).as_deref() == Some("Cell 1:1"))
            .unwrap();
        doc.set_override(target, "cell/label", OverrideValue::Text("Name".into()))
            .unwrap();

        let out = block_on(edit_table(
            &Libraries::standard(),
            &mut doc,
            root,
            &options(5, 2, GroupBy::Row),
            &BuildContext::default(),
        ))
        .unwrap();

        assert_eq!(out.root, root);
        let texts: Vec<_> = of_kind(&doc, root, NodeKind::Cell)
            .into_iter()
            .filter_map(|id| text(&doc, id))
            .collect();
        assert_eq!(texts.len(), 10);
        assert_eq!(texts[0], "Name");
        assert_eq!(texts[1], "Cell 1:2");
    }

    #[test]
    fn test_edit_matches_fresh_build() {
        let mut edited = MemoryDocument::new();
        let root = build(&mut edited, &options(1, 1, GroupBy::Row));
        block_on(edit_table(
            &Libraries::standard(),
            &mut edited,
            root,
            &options(2, 4, GroupBy::Column),
            &BuildContext::default(),
        ))
        .unwrap();

        let mut fresh = MemoryDocument::new();
        let other = build(&mut fresh, &options(2, 4, GroupBy::Column));
        assert_eq!(shape(&edited, root), shape(&fresh, other));
    }

    #[test]
    fn test_edit_from_inner_selection_through_bridge() {
        let mut doc = MemoryDocument::new();
        let root = build(&mut doc, &options(2, 2, GroupBy::Row));
        let cell = of_kind(&doc, root, NodeKind::Cell)[3];
        doc.set_selection(&[cell]);

        let mut dispatcher = Dispatcher::new(Libraries::standard(), Some(doc), Config::default());
        let state = dispatcher.open().unwrap();
        assert_eq!(state.mode, Mode::Edit);
        assert_eq!(state.target, Some(root));

        let fields = RawOptions::from(&state.options).with("colCount", "3");
        let outcome = block_on(dispatcher.dispatch(Command::Submit { fields }));
        let Outcome::Edited(result) = outcome else {
            panic!("expected an edit, got {:?}", outcome);
        };
        assert_eq!(result.root, root);
        assert_eq!(result.options.col_count, 3);

        let doc = dispatcher.into_document().unwrap();
        assert_eq!(doc.top_level(), vec![root]);
        assert_eq!(of_kind(&doc, root, NodeKind::Cell).len(), 6);
    }
}

// ============================================================================
// Options Window Bridge
// ============================================================================

mod bridge {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_post_with_string_numbers() {
        let mut dispatcher =
            Dispatcher::new(Libraries::standard(), Some(MemoryDocument::new()), Config::default());
        dispatcher.open().unwrap();

        let payload = json!({
            "rowCount": "2",
            "colCount": "3",
            "cellWidth": "200",
            "rowHeight": "56",
            "groupBy": "column",
            "cellStyleName": "",
        })
        .to_string();
        let message = json!({"type": "submit", "payload": payload}).to_string();

        let outcome = block_on(dispatcher.dispatch_json(&message));
        let Outcome::Built(result) = outcome else {
            panic!("expected a build, got {:?}", outcome);
        };
        assert_eq!(result.options.group_by, GroupBy::Column);
        assert_eq!(result.options.cell_style_name, "Table/Cell/Default/Transparent");
        assert_eq!(result.message, "Tableau de 2 lignes et 3 colonnes inséré dans le document !");
    }

    #[test]
    fn test_legacy_fields() {
        let opts = normalize_options(r#"{"groupByColumn": true, "colWidth": "120"}"#).unwrap();
        assert_eq!(opts.group_by, GroupBy::Column);
        assert_eq!(opts.cell_width, 120.0);
    }

    #[test]
    fn test_config_drives_locale_and_catalog() {
        let mut library = MemoryLibrary::standard("design-system");
        library.add_style("Table/Row/_Title");
        assert!(library.remove_style("Table/Row/_Header"));

        let config = Config::from_toml(
            r#"
            locale = "en"
            [catalog]
            header_row_style = "Table/Row/_Title"
            "#,
        )
        .unwrap();
        let libraries = Libraries::new().with(library);
        let mut dispatcher = Dispatcher::new(libraries, Some(MemoryDocument::new()), config);
        dispatcher.open().unwrap();

        let outcome = block_on(dispatcher.dispatch(Command::Submit {
            fields: RawOptions::new().with("colCount", 2),
        }));
        let Outcome::Built(result) = outcome else {
            panic!("expected a build, got {:?}", outcome);
        };
        assert_eq!(result.message, "Table of 1 row and 2 columns inserted.");
    }

    #[test]
    fn test_outcome_wire_form() {
        let value = serde_json::to_value(Outcome::Resized {
            width: 280.0,
            height: 512.0,
        })
        .unwrap();
        assert_eq!(value, json!({"type": "resized", "width": 280.0, "height": 512.0}));
        assert_eq!(serde_json::to_value(Outcome::Cancelled).unwrap(), json!({"type": "cancelled"}));
    }

    #[test]
    fn test_document_snapshot_round_trip() {
        let mut doc = MemoryDocument::new();
        let root = build(&mut doc, &options(2, 2, GroupBy::Row));

        let restored = MemoryDocument::from_json(&doc.to_json()).unwrap();
        assert_eq!(restored, doc);
        assert_eq!(restored.get_metadata(root, "type"), Some(json!("table")));
    }
}
