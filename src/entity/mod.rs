//! Entity model: records persisted through the generic data-access layer.

pub mod hero;

pub use hero::{Hero, HeroChanges, NewHero, Role, HEROES, ROLES};

use crate::sql::{SqlValue, Table};
use sqlx::postgres::PgRow;
use std::fmt::Debug;

/// Explicit field mapping: the `(column, value)` pairs a struct writes.
pub trait Assign {
    fn assignments(&self) -> Vec<(&'static str, SqlValue)>;

    fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }
}

/// A row type with an identifier, stored in a statically described table.
pub trait Entity: for<'r> sqlx::FromRow<'r, PgRow> + Clone + Debug + Send + Sync + Unpin + 'static {
    type Id: Clone + Debug + PartialEq + Into<SqlValue> + Send + Sync + 'static;
    /// Fields supplied on insert; the store fills in the rest.
    type New: Assign + Send + Sync;
    /// Partial assignment applied on update.
    type Changes: Assign + Send + Sync;

    const TABLE: &'static Table;

    /// Current value of `column`; `SqlValue::Null` for unknown columns.
    fn value(&self, column: &str) -> SqlValue;
}
