use proptest::prelude::*;
use schemaboard::editor::Editor;
use schemaboard::ident::{ColumnRef, EntityPath, TableKey};
use schemaboard::model::Relation;
use schemaboard::record::HEADER;
use std::collections::BTreeSet;

const SCHEMAS: [&str; 2] = ["A", "B"];
const TABLES: [&str; 3] = ["t1", "t2", "t3"];
const COLUMNS: [&str; 3] = ["c1", "c2", "c3"];

type Slot = (usize, usize, usize);

fn arb_slot() -> impl Strategy<Value = Slot> {
    (0..SCHEMAS.len(), 0..TABLES.len(), 0..COLUMNS.len())
}

fn arb_rows() -> impl Strategy<Value = Vec<(Slot, Option<Slot>)>> {
    prop::collection::vec((arb_slot(), prop::option::of(arb_slot())), 1..16)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    RenameSchema,
    RenameTable,
    RenameColumn,
    DeleteSchema,
    DeleteTable,
    DeleteColumn,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::RenameSchema),
        Just(Op::RenameTable),
        Just(Op::RenameColumn),
        Just(Op::DeleteSchema),
        Just(Op::DeleteTable),
        Just(Op::DeleteColumn),
    ]
}

fn column((s, t, c): Slot) -> ColumnRef {
    ColumnRef::new(SCHEMAS[s], TABLES[t], COLUMNS[c])
}

fn document(rows: &[(Slot, Option<Slot>)]) -> String {
    let mut text = format!("{HEADER}\n");
    for (from, to) in rows {
        let from = column(*from);
        match to.map(column) {
            Some(to) => text.push_str(&format!(
                "{};{};{};{};{};{}\n",
                from.schema, from.table, from.column, to.schema, to.table, to.column
            )),
            None => text.push_str(&format!("{};{};{}\n", from.schema, from.table, from.column)),
        }
    }
    text
}

fn relations(editor: &Editor) -> BTreeSet<Relation> {
    editor.graph().relations().cloned().collect()
}

/// Satellite stores only ever hold keys of tables that exist.
fn assert_stores_match_graph(editor: &Editor) {
    let tables: BTreeSet<TableKey> = editor.graph().table_keys().into_iter().collect();
    let positioned: BTreeSet<TableKey> = editor.positions().keys().cloned().collect();
    let known: BTreeSet<TableKey> = editor.filter().known_keys().cloned().collect();
    assert_eq!(positioned, tables);
    assert_eq!(known, tables);
    for key in editor.selection().selected_tables() {
        assert!(tables.contains(key));
    }
}

proptest! {
    #[test]
    fn test_cascades_keep_stores_consistent(
        rows in arb_rows(),
        op in arb_op(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut editor = Editor::default();
        editor.load(&document(&rows));

        let target = column(rows[pick.index(rows.len())].0);
        let key = target.table_key();
        editor.click_table(&key, false);
        editor.click_column(&target);

        let before = relations(&editor);

        match op {
            Op::RenameSchema => {
                editor.rename(&EntityPath::Schema(target.schema.clone()), "Z").unwrap();
                let after = relations(&editor);
                prop_assert_eq!(after.len(), before.len());
                prop_assert!(
                    after
                        .iter()
                        .all(|r| r.from.schema != target.schema && r.to.schema != target.schema)
                );
                prop_assert!(editor.positions().keys().all(|k| k.schema != target.schema));
            }
            Op::RenameTable => {
                editor.rename(&EntityPath::Table(key.clone()), "renamed").unwrap();
                let after = relations(&editor);
                prop_assert_eq!(after.len(), before.len());
                prop_assert!(after.iter().all(|r| !r.from.is_in(&key) && !r.to.is_in(&key)));
                let renamed = TableKey::new(key.schema.clone(), "renamed");
                prop_assert!(editor.selection().contains_table(&renamed));
            }
            Op::RenameColumn => {
                editor.rename(&EntityPath::Column(target.clone()), "renamed").unwrap();
                let after = relations(&editor);
                prop_assert_eq!(after.len(), before.len());
                prop_assert!(after.iter().all(|r| r.from != target && r.to != target));
            }
            Op::DeleteSchema => {
                editor.delete(&EntityPath::Schema(target.schema.clone())).unwrap();
                let after = relations(&editor);
                prop_assert!(
                    after
                        .iter()
                        .all(|r| r.from.schema != target.schema && r.to.schema != target.schema)
                );
                prop_assert!(after.is_subset(&before));
            }
            Op::DeleteTable => {
                editor.delete(&EntityPath::Table(key.clone())).unwrap();
                let after = relations(&editor);
                prop_assert!(after.iter().all(|r| !r.from.is_in(&key) && !r.to.is_in(&key)));
                prop_assert!(!editor.selection().contains_table(&key));
                prop_assert!(after.is_subset(&before));
            }
            Op::DeleteColumn => {
                editor.delete(&EntityPath::Column(target.clone())).unwrap();
                let after = relations(&editor);
                prop_assert!(after.iter().all(|r| r.from != target && r.to != target));
                prop_assert!(!editor.selection().is_column_selected(&target));
                prop_assert!(after.is_subset(&before));
            }
        }

        assert_stores_match_graph(&editor);
    }

    #[test]
    fn test_export_import_round_trip(rows in arb_rows()) {
        let mut editor = Editor::default();
        editor.load(&document(&rows));

        let mut reloaded = Editor::default();
        reloaded.load(&editor.export_text());

        prop_assert_eq!(reloaded.graph().table_keys(), editor.graph().table_keys());
        prop_assert_eq!(relations(&reloaded), relations(&editor));
        for key in editor.graph().table_keys() {
            prop_assert_eq!(
                reloaded.graph().table(&key).map(|t| t.columns().to_vec()),
                editor.graph().table(&key).map(|t| t.columns().to_vec())
            );
            prop_assert_eq!(reloaded.positions().get(&key), editor.positions().get(&key));
        }
    }
}
