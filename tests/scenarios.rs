use schemaboard::drag::DragTarget;
use schemaboard::editor::Editor;
use schemaboard::ident::{ColumnRef, EntityPath, TableKey};
use schemaboard::model::Relation;
use schemaboard::position::Point;
use schemaboard::record::{HEADER, Record, data_lines};
use std::collections::BTreeSet;

fn load(body: &str) -> Editor {
    let mut editor = Editor::default();
    editor.load(&format!("{HEADER}\n{body}"));
    editor
}

fn key(s: &str, t: &str) -> TableKey {
    TableKey::new(s, t)
}

#[test]
fn test_users_orders_import_and_export() {
    let editor = load("A;Users;id;;;\nA;Orders;user_id;A;Users;id\n");
    let graph = editor.graph();

    let schemas: Vec<&str> = graph.schemas().map(|(name, _)| name).collect();
    assert_eq!(schemas, ["A"]);
    assert_eq!(graph.table(&key("A", "Users")).unwrap().columns(), ["id"]);
    assert_eq!(graph.table(&key("A", "Orders")).unwrap().columns(), ["user_id"]);
    assert_eq!(
        graph.relations().cloned().collect::<Vec<_>>(),
        [Relation::new(
            ColumnRef::new("A", "Orders", "user_id"),
            ColumnRef::new("A", "Users", "id"),
        )]
    );

    let exported = editor.export_text();
    let rows: Vec<Record> = data_lines(&exported).map(Record::parse_line).collect();
    assert_eq!(rows.len(), 2);

    let users = rows.iter().find(|r| r.table == "Users").unwrap();
    assert_eq!(users.column, "id");
    assert_eq!(users.relation_target(), None);

    let orders = rows.iter().find(|r| r.table == "Orders").unwrap();
    assert_eq!(orders.column, "user_id");
    assert_eq!(orders.relation_target(), Some((Some("A"), "Users", "id")));
}

#[test]
fn test_round_trip_keeps_columns_and_relations() {
    let editor = load(
        "A;Users;id\nA;Users;name\n\
         A;Orders;id\nA;Orders;user_id;;Users;id\nA;Orders;user_id;B;Accounts;owner\n\
         B;Accounts;owner\nB;Accounts;created_by;;Users;id\n",
    );

    let columns = |e: &Editor| -> BTreeSet<ColumnRef> {
        e.graph()
            .tables()
            .flat_map(|(k, t)| t.columns().iter().map(move |c| k.column(c.as_str())))
            .collect()
    };
    let relations = |e: &Editor| -> BTreeSet<Relation> { e.graph().relations().cloned().collect() };

    let mut reloaded = Editor::default();
    reloaded.load(&editor.export_text());

    assert_eq!(columns(&reloaded), columns(&editor));
    assert_eq!(relations(&reloaded), relations(&editor));
    assert_eq!(relations(&editor).len(), 3);
}

#[test]
fn test_rename_cascade_leaves_no_old_references() {
    let mut editor = load(
        "A;Users;id\nA;Orders;user_id;;Users;id\nB;Audit;user_ref;A;Users;id\nA;Users;id;B;Audit;user_ref\n",
    );
    let before = editor.graph().stats().relations;

    editor
        .rename(&EntityPath::Table(key("A", "Users")), "Members")
        .unwrap();

    assert_eq!(editor.graph().stats().relations, before);
    for rel in editor.graph().relations() {
        assert_ne!(rel.from.table_key(), key("A", "Users"));
        assert_ne!(rel.to.table_key(), key("A", "Users"));
    }

    editor
        .rename(&EntityPath::Column(ColumnRef::new("A", "Members", "id")), "member_id")
        .unwrap();
    assert_eq!(editor.graph().stats().relations, before);
    assert!(
        editor
            .graph()
            .relations()
            .all(|r| r.from.column != "id" && r.to.column != "id")
    );

    editor.rename(&EntityPath::Schema("A".into()), "Core").unwrap();
    assert_eq!(editor.graph().stats().relations, before);
    assert!(
        editor
            .graph()
            .relations()
            .all(|r| r.from.schema != "A" && r.to.schema != "A")
    );
}

#[test]
fn test_delete_cascade_completeness() {
    let mut editor = load("A;Users;id\nA;Orders;user_id;;Users;id\nA;Users;id;;Orders;user_id\n");
    let users = key("A", "Users");
    editor.click_table(&users, false);
    editor.click_column(&ColumnRef::new("A", "Users", "id"));

    editor.delete(&EntityPath::Table(users.clone())).unwrap();

    assert!(editor.graph().relations().all(|r| !r.from.is_in(&users) && !r.to.is_in(&users)));
    assert!(editor.positions().keys().all(|k| k != &users));
    assert!(editor.filter().known_keys().all(|k| k != &users));
    assert!(!editor.selection().contains_table(&users));
    assert!(editor.selection().selected_columns().is_empty());
}

#[test]
fn test_add_relation_twice_yields_one_edge() {
    let mut editor = load("A;X;a\nA;Y;b\n");
    let a = ColumnRef::new("A", "X", "a");
    let b = ColumnRef::new("A", "Y", "b");
    assert!(editor.add_relation(&a, &b).unwrap());
    assert!(!editor.add_relation(&a, &b).unwrap());
    assert_eq!(editor.graph().stats().relations, 1);
}

#[test]
fn test_column_selection_eviction() {
    let mut editor = load("A;X;c1\nA;X;c2\nA;Y;c2\n");

    editor.click_column(&ColumnRef::new("A", "X", "c1"));
    editor.click_column(&ColumnRef::new("A", "X", "c2"));
    assert_eq!(
        editor.selection().selected_columns(),
        [ColumnRef::new("A", "X", "c2")]
    );

    editor.click_background();
    editor.click_column(&ColumnRef::new("A", "X", "c1"));
    let created = editor.click_column(&ColumnRef::new("A", "Y", "c2"));
    assert_eq!(
        created,
        Some(Relation::new(
            ColumnRef::new("A", "X", "c1"),
            ColumnRef::new("A", "Y", "c2"),
        ))
    );
    assert!(editor.selection().selected_columns().is_empty());
}

#[test]
fn test_edge_visible_iff_both_tables_visible() {
    let mut editor = load(
        "A;T1;id\nA;T2;id;;T1;id\nA;T3;id;;T2;id\nA;T3;ref;;T1;id\nA;T1;self;;T1;id\n",
    );
    let keys = editor.graph().table_keys();

    for mask in 0..(1u32 << keys.len()) {
        let shown: Vec<TableKey> = keys
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, k)| k.clone())
            .collect();
        editor.set_filter(shown.clone());

        let plan = editor.render_plan();
        let drawn: BTreeSet<Relation> = plan.edges.iter().map(|e| e.relation.clone()).collect();
        for rel in editor.graph().relations() {
            let both = shown.contains(&rel.from.table_key()) && shown.contains(&rel.to.table_key());
            assert_eq!(drawn.contains(rel), both, "{} -> {} with mask {mask:b}", rel.from, rel.to);
        }
    }
}

#[test]
fn test_bring_to_top_is_strict() {
    let mut editor = load("A;T1;id;;;;0;0;9\nA;T2;id;;;;0;0;9\nA;T3;id;;;;0;0;4\n");
    for table in ["T3", "T1", "T2", "T3"] {
        let k = key("A", table);
        editor.click_table(&k, false);
        let z = editor.positions().get(&k).unwrap().z;
        for other in editor.positions().keys().filter(|o| *o != &k) {
            assert!(z > editor.positions().get(other).unwrap().z);
        }
    }
}

#[test]
fn test_bring_to_top_stays_strict_at_z_limit() {
    let mut editor = load("A;T1;id;;;;0;0;9223372036854775807\nA;T2;id;;;;0;0;3\n");
    let (t1, t2) = (key("A", "T1"), key("A", "T2"));

    editor.click_table(&t2, false);
    let z1 = editor.positions().get(&t1).unwrap().z;
    let z2 = editor.positions().get(&t2).unwrap().z;
    assert!(z2 > z1);

    editor.click_table(&t1, false);
    let z1 = editor.positions().get(&t1).unwrap().z;
    assert!(z1 > editor.positions().get(&t2).unwrap().z);
}

#[test]
fn test_drag_is_relative_to_snapshot() {
    let mut editor = load("A;T1;id;;;;100;100;3\n");
    let k = key("A", "T1");
    editor
        .drag_start(DragTarget::Table(k.clone()), Point::new(10.0, 10.0))
        .unwrap();
    for step in 1..=20 {
        editor
            .drag_move(Point::new(10.0 + step as f64 * 0.1, 10.0))
            .unwrap();
    }
    editor.drag_end().unwrap();
    let pos = editor.positions().get(&k).unwrap();
    assert!((pos.x - 102.0).abs() < 1e-9);
    assert_eq!(pos.y, 100.0);
}
