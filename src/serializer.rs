//! Export: write the graph back to the `;`-delimited interchange format.

use crate::filter::TableFilter;
use crate::model::SchemaGraph;
use crate::position::{Position, PositionStore};
use crate::record::{HEADER, Record};
use tracing::warn;

/// Serialize the graph, one line per (table, column) and one more for each
/// additional relation leaving that column.
pub fn serialize(graph: &SchemaGraph, positions: &PositionStore, filter: &TableFilter) -> String {
    let mut output = String::from(HEADER);
    output.push('\n');

    for record in records(graph, positions, filter) {
        output.push_str(&record.to_line());
        output.push('\n');
    }

    output
}

/// The rows [`serialize`] writes, in output order.
pub fn records(
    graph: &SchemaGraph,
    positions: &PositionStore,
    filter: &TableFilter,
) -> Vec<Record> {
    let mut rows = Vec::new();

    for (name, schema) in graph.schemas() {
        if schema.tables().next().is_none() {
            warn!("schema {name} has no tables and is left out of the export");
        }
    }

    for (key, table) in graph.tables() {
        if table.columns().is_empty() {
            warn!("table {key} has no columns and is left out of the export");
            continue;
        }
        let pos = positions.get(&key).copied().unwrap_or(Position {
            x: 0.0,
            y: 0.0,
            z: positions.min_z(),
        });
        let base = Record {
            schema: key.schema.clone(),
            table: key.table.clone(),
            pos_x: Some(pos.x),
            pos_y: Some(pos.y),
            pos_z: Some(pos.z),
            visible: Some(filter.is_visible(&key)),
            ..Record::default()
        };

        for column in table.columns() {
            let mut outgoing = table
                .relations()
                .iter()
                .filter(|r| &r.from.column == column)
                .peekable();

            if outgoing.peek().is_none() {
                rows.push(Record {
                    column: column.clone(),
                    ..base.clone()
                });
                continue;
            }
            for rel in outgoing {
                rows.push(Record {
                    column: column.clone(),
                    relation_schema: Some(rel.to.schema.clone()),
                    relation_table: Some(rel.to.table.clone()),
                    relation_column: Some(rel.to.column.clone()),
                    ..base.clone()
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{ColumnRef, TableKey};
    use crate::parser::Parser;

    fn users_orders() -> (SchemaGraph, PositionStore, TableFilter) {
        let mut graph = SchemaGraph::new();
        for (t, c) in [("Users", "id"), ("Orders", "id"), ("Orders", "user_id")] {
            graph.ensure_column(&ColumnRef::new("S", t, c));
        }
        graph
            .add_relation(
                &ColumnRef::new("S", "Orders", "user_id"),
                &ColumnRef::new("S", "Users", "id"),
            )
            .unwrap();

        let mut positions = PositionStore::new(3);
        positions.insert(TableKey::new("S", "Users"), Position { x: 10.0, y: 20.5, z: 4 });

        let mut filter = TableFilter::new(true);
        filter.register(TableKey::new("S", "Users"), true);
        filter.register(TableKey::new("S", "Orders"), false);
        (graph, positions, filter)
    }

    #[test]
    fn test_serialize_lines() {
        let (graph, positions, filter) = users_orders();
        let text = serialize(&graph, &positions, &filter);
        let expected = format!(
            "{HEADER}\n\
             S;Orders;id;;;;0;0;3;false\n\
             S;Orders;user_id;S;Users;id;0;0;3;false\n\
             S;Users;id;;;;10;20.5;4;true\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_one_line_per_relation() {
        let (mut graph, positions, filter) = users_orders();
        graph
            .add_relation(
                &ColumnRef::new("S", "Orders", "user_id"),
                &ColumnRef::new("S", "Users", "legacy_id"),
            )
            .unwrap();
        let rows = records(&graph, &positions, &filter);
        let user_id_rows = rows.iter().filter(|r| r.column == "user_id").count();
        assert_eq!(user_id_rows, 2);
    }

    #[test]
    fn test_round_trip() {
        let (graph, positions, filter) = users_orders();
        let doc = Parser::new(&serialize(&graph, &positions, &filter)).parse();

        assert_eq!(doc.graph.table_keys(), graph.table_keys());
        assert_eq!(
            doc.graph.relations().collect::<Vec<_>>(),
            graph.relations().collect::<Vec<_>>()
        );
        let users = TableKey::new("S", "Users");
        assert_eq!(doc.positions.get(&users), positions.get(&users));
        assert_eq!(doc.visibility[&TableKey::new("S", "Orders")], false);
    }

    #[test]
    fn test_empty_graph() {
        let text = serialize(&SchemaGraph::new(), &PositionStore::new(3), &TableFilter::new(true));
        assert_eq!(text, format!("{HEADER}\n"));
    }

    #[test]
    fn test_empty_tables_and_schemas_write_no_rows() {
        let (mut graph, positions, filter) = users_orders();
        let added = graph.add_table("S").unwrap();
        graph.add_schema(Some("Empty")).unwrap();

        let rows = records(&graph, &positions, &filter);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.table != added.table && r.schema != "Empty"));
    }
}
