//! Static table definitions. Every identifier that reaches SQL text comes from here.

/// One column: name, PostgreSQL type used to cast bound parameters, and its DDL definition.
#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub pg_type: &'static str,
    pub definition: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, pg_type: &'static str) -> Self {
        Column {
            name,
            pg_type,
            definition: pg_type,
        }
    }

    /// Full DDL type with constraints and default, e.g. `TIMESTAMPTZ NOT NULL DEFAULT NOW()`.
    pub const fn defined_as(self, definition: &'static str) -> Self {
        Column { definition, ..self }
    }
}

/// PostgreSQL enum type backing a column (created at bootstrap).
#[derive(Clone, Copy, Debug)]
pub struct EnumType {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    /// Column sets with a UNIQUE constraint.
    pub unique: &'static [&'static [&'static str]],
    /// Columns with a plain btree index.
    pub indexed: &'static [&'static str],
    /// Column bumped to NOW() whenever a row is updated.
    pub touch_column: Option<&'static str>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
