//! Composite identifiers shared by the graph, position, visibility and
//! selection stores.

use std::fmt;

/// A table address: `(schema, table)`, displayed as `schema.table`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub schema: String,
    pub table: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse `schema.table`, splitting at the first dot.
    pub fn parse(s: &str) -> Option<Self> {
        let (schema, table) = s.split_once('.')?;
        Some(Self::new(schema, table))
    }

    pub fn column(&self, column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: column.into(),
        }
    }

    pub fn in_schema(&self, schema: &str) -> bool {
        self.schema == schema
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// A column address: `(schema, table, column)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn table_key(&self) -> TableKey {
        TableKey::new(self.schema.clone(), self.table.clone())
    }

    pub fn is_in(&self, key: &TableKey) -> bool {
        self.schema == key.schema && self.table == key.table
    }

    pub fn same_table(&self, other: &ColumnRef) -> bool {
        self.schema == other.schema && self.table == other.table
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Schema,
    Table,
    Column,
    Relation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Relation => "relation",
        };
        f.write_str(s)
    }
}

/// Target of a generic rename or delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPath {
    Schema(String),
    Table(TableKey),
    Column(ColumnRef),
}

impl EntityPath {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Schema(_) => EntityKind::Schema,
            Self::Table(_) => EntityKind::Table,
            Self::Column(_) => EntityKind::Column,
        }
    }

    /// Build a path from optional UI fields: column wins over table over schema.
    pub fn from_parts(schema: &str, table: Option<&str>, column: Option<&str>) -> Self {
        match (table, column) {
            (Some(t), Some(c)) => Self::Column(ColumnRef::new(schema, t, c)),
            (Some(t), None) => Self::Table(TableKey::new(schema, t)),
            _ => Self::Schema(schema.to_string()),
        }
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(name) => f.write_str(name),
            Self::Table(key) => key.fmt(f),
            Self::Column(col) => col.fmt(f),
        }
    }
}
