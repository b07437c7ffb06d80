//! One row of the `;`-delimited interchange format.

use crate::ident::{ColumnRef, TableKey};

pub const HEADER: &str = "schema;table_name;column_name;relation_schema;relation_table_name;relation_column_name;pos_x;pos_y;pos_z;visibility_state";

const DELIMITER: char = ';';

/// A parsed data row. Missing or malformed fields never fail the row:
/// required names default to the empty string, everything else to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub relation_schema: Option<String>,
    pub relation_table: Option<String>,
    pub relation_column: Option<String>,
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub pos_z: Option<i64>,
    pub visible: Option<bool>,
}

impl Record {
    pub fn parse_line(line: &str) -> Self {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");
        let optional = |i: usize| Some(field(i)).filter(|s| !s.is_empty()).map(str::to_string);

        Self {
            schema: field(0).to_string(),
            table: field(1).to_string(),
            column: field(2).to_string(),
            relation_schema: optional(3),
            relation_table: optional(4),
            relation_column: optional(5),
            pos_x: parse_coord(field(6)),
            pos_y: parse_coord(field(7)),
            pos_z: parse_z(field(8)),
            visible: Some(field(9)).filter(|s| !s.is_empty()).map(|s| s == "true"),
        }
    }

    pub fn table_key(&self) -> TableKey {
        TableKey::new(self.schema.as_str(), self.table.as_str())
    }

    pub fn column_ref(&self) -> ColumnRef {
        ColumnRef::new(self.schema.as_str(), self.table.as_str(), self.column.as_str())
    }

    pub fn has_position(&self) -> bool {
        self.pos_x.is_some() || self.pos_y.is_some()
    }

    /// Relation target as `(schema, table, column)` when both the table and
    /// the column are given. The schema may still need resolving.
    pub fn relation_target(&self) -> Option<(Option<&str>, &str, &str)> {
        let table = self.relation_table.as_deref()?;
        let column = self.relation_column.as_deref()?;
        Some((self.relation_schema.as_deref(), table, column))
    }

    pub fn to_line(&self) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let num = |v: Option<String>| v.unwrap_or_default();
        [
            self.schema.clone(),
            self.table.clone(),
            self.column.clone(),
            opt(&self.relation_schema),
            opt(&self.relation_table),
            opt(&self.relation_column),
            num(self.pos_x.map(|v| v.to_string())),
            num(self.pos_y.map(|v| v.to_string())),
            num(self.pos_z.map(|v| v.to_string())),
            num(self.visible.map(|v| v.to_string())),
        ]
        .join(";")
    }
}

fn parse_coord(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_z(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_coord(s).map(|v| v.trunc() as i64))
}

/// Data lines of an import: split on `\r\n`, `\n` or `\r`, blank lines
/// dropped, first remaining line (the header) skipped.
pub fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .skip(1)
}

pub fn parse_records(text: &str) -> Vec<Record> {
    data_lines(text).map(Record::parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_and_header() {
        let text = format!("{HEADER}\r\nS;a;id\r\n\r\n   \nS;b;id\rS;c;id\n");
        let tables: Vec<String> = parse_records(&text).into_iter().map(|r| r.table).collect();
        assert_eq!(tables, ["a", "b", "c"]);
    }

    #[test]
    fn test_header_is_first_nonblank_line() {
        let records = parse_records("\n\nanything;at;all\nS;t;c\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].column_ref(), ColumnRef::new("S", "t", "c"));
    }

    #[test]
    fn test_short_row_defaults() {
        let r = Record::parse_line("S;t");
        assert_eq!(r.column, "");
        assert_eq!(r.relation_target(), None);
        assert!(!r.has_position());
        assert_eq!(r.visible, None);
    }

    #[test]
    fn test_full_row() {
        let r = Record::parse_line("S;orders;user_id;;users;id;12.5;abc;7;true");
        assert_eq!(r.relation_target(), Some((None, "users", "id")));
        assert_eq!(r.pos_x, Some(12.5));
        assert_eq!(r.pos_y, None);
        assert!(r.has_position());
        assert_eq!(r.pos_z, Some(7));
        assert_eq!(r.visible, Some(true));
    }

    #[test]
    fn test_visibility_values() {
        assert_eq!(Record::parse_line("S;t;c;;;;;;;false").visible, Some(false));
        assert_eq!(Record::parse_line("S;t;c;;;;;;;TRUE").visible, Some(false));
        assert_eq!(Record::parse_line("S;t;c;;;;;;;").visible, None);
    }

    #[test]
    fn test_z_accepts_fractional_input() {
        assert_eq!(Record::parse_line("S;t;c;;;;0;0;4.9").pos_z, Some(4));
        assert_eq!(Record::parse_line("S;t;c;;;;0;0;x").pos_z, None);
    }

    #[test]
    fn test_relation_needs_table_and_column() {
        assert_eq!(Record::parse_line("S;t;c;R;u;").relation_target(), None);
        assert_eq!(
            Record::parse_line("S;t;c;R;u;id").relation_target(),
            Some((Some("R"), "u", "id"))
        );
    }

    #[test]
    fn test_to_line() {
        let line = "S;orders;user_id;S;users;id;100;-20.5;3;false";
        assert_eq!(Record::parse_line(line).to_line(), line);
    }
}
