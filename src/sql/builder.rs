//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and COUNT from a table definition.

use crate::error::StoreError;
use crate::sql::filter::{contains_pattern, Filter, OrderBy, Query};
use crate::sql::params::SqlValue;
use crate::sql::table::Table;

/// Quote identifier for PostgreSQL (safe: only from table definitions).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder for a value bound to `column`, cast to the column's type.
    fn placeholder(&mut self, table: &Table, column: &str, v: SqlValue) -> Result<String, StoreError> {
        let col = table
            .column(column)
            .ok_or_else(|| StoreError::UnknownField(column.to_string()))?;
        let n = self.push_param(v);
        Ok(format!("${}::{}", n, col.pg_type))
    }
}

fn select_column_list(table: &Table) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(q: &mut QueryBuf, table: &Table, filters: &[Filter]) -> Result<String, StoreError> {
    let mut parts = Vec::with_capacity(filters.len());
    for f in filters {
        let col = f.column();
        if !table.has_column(col) {
            return Err(StoreError::UnknownField(col.to_string()));
        }
        let part = match f {
            Filter::Eq(_, v) => {
                let ph = q.placeholder(table, col, v.clone())?;
                format!("{} = {}", quoted(col), ph)
            }
            Filter::Contains(_, needle) => {
                let n = q.push_param(SqlValue::Text(contains_pattern(needle)));
                format!("{}::text ILIKE ${}::text", quoted(col), n)
            }
            Filter::IsNull(_) => format!("{} IS NULL", quoted(col)),
        };
        parts.push(part);
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

fn order_clause(table: &Table, order_by: &[OrderBy]) -> Result<String, StoreError> {
    if order_by.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(order_by.len());
    for o in order_by {
        if !table.has_column(&o.field) {
            return Err(StoreError::UnknownField(o.field.clone()));
        }
        let dir = if o.desc { " DESC" } else { "" };
        parts.push(format!("{}{}", quoted(&o.field), dir));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

/// Rejects order-by fields that are not columns of `table`.
pub fn check_order_by(table: &Table, order_by: &[OrderBy]) -> Result<(), StoreError> {
    order_clause(table, order_by).map(|_| ())
}

/// SELECT by primary key. The id is the sole param.
pub fn select_by_id(table: &Table, id: SqlValue) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(table, table.primary_key, id)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(table),
        quoted(table.name),
        quoted(table.primary_key),
        ph
    );
    Ok(q)
}

/// SELECT with conjunctive filters, ORDER BY, OFFSET and LIMIT.
pub fn select(table: &Table, query: &Query) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, &query.filters)?;
    let order_sql = order_clause(table, &query.order_by)?;
    q.sql = format!(
        "SELECT {} FROM {}{}{} OFFSET {} LIMIT {}",
        select_column_list(table),
        quoted(table.name),
        where_sql,
        order_sql,
        query.offset,
        query.limit
    );
    Ok(q)
}

/// SELECT COUNT over the same conjunctive filters.
pub fn count(table: &Table, filters: &[Filter]) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, filters)?;
    q.sql = format!(
        "SELECT COUNT({}) FROM {}{}",
        quoted(table.primary_key),
        quoted(table.name),
        where_sql
    );
    Ok(q)
}

/// INSERT the given assignments; columns not assigned take their DB default. Returns the full row.
pub fn insert(table: &Table, values: &[(&'static str, SqlValue)]) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (col, v) in values {
        placeholders.push(q.placeholder(table, col, v.clone())?);
        cols.push(quoted(col));
    }
    let target = if cols.is_empty() {
        " DEFAULT VALUES".to_string()
    } else {
        format!(" ({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {}{} RETURNING {}",
        quoted(table.name),
        target,
        select_column_list(table)
    );
    Ok(q)
}

fn set_clause(q: &mut QueryBuf, table: &Table, values: &[(&'static str, SqlValue)]) -> Result<String, StoreError> {
    let mut sets = Vec::with_capacity(values.len() + 1);
    for (col, v) in values {
        if *col == table.primary_key {
            continue;
        }
        let ph = q.placeholder(table, col, v.clone())?;
        sets.push(format!("{} = {}", quoted(col), ph));
    }
    if let Some(touch) = table.touch_column {
        if !values.iter().any(|(c, _)| *c == touch) {
            sets.push(format!("{} = NOW()", quoted(touch)));
        }
    }
    Ok(sets.join(", "))
}

/// UPDATE one row by primary key. Callers skip this when there is nothing to assign.
pub fn update_by_id(
    table: &Table,
    id: SqlValue,
    values: &[(&'static str, SqlValue)],
) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let sets = set_clause(&mut q, table, values)?;
    let id_ph = q.placeholder(table, table.primary_key, id)?;
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets,
        quoted(table.primary_key),
        id_ph,
        select_column_list(table)
    );
    Ok(q)
}

/// UPDATE every row matching the filters.
pub fn update_where(
    table: &Table,
    filters: &[Filter],
    values: &[(&'static str, SqlValue)],
) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let sets = set_clause(&mut q, table, values)?;
    let where_sql = where_clause(&mut q, table, filters)?;
    q.sql = format!("UPDATE {} SET {}{}", quoted(table.name), sets, where_sql);
    Ok(q)
}

/// DELETE by primary key, returning the key of the removed row.
pub fn delete_by_id(table: &Table, id: SqlValue) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(table, table.primary_key, id)?;
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        quoted(table.primary_key),
        ph,
        quoted(table.primary_key)
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::table::Column;

    const ITEMS: Table = Table {
        name: "items",
        primary_key: "id",
        columns: &[
            Column::new("id", "uuid"),
            Column::new("name", "text"),
            Column::new("kind", "item_kind"),
            Column::new("updated_at", "timestamptz"),
            Column::new("deleted_at", "timestamptz"),
        ],
        unique: &[&["name"]],
        indexed: &[],
        touch_column: Some("updated_at"),
    };

    #[test]
    fn select_renders_filters_order_and_window() {
        let query = Query::filtered(vec![
            Filter::Contains("name", "ab".into()),
            Filter::Eq("kind", SqlValue::Text("tool".into())),
            Filter::IsNull("deleted_at"),
        ])
        .order_by(vec![OrderBy::desc("updated_at"), OrderBy::asc("name")])
        .window(20, 10);
        let q = select(&ITEMS, &query).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"kind\", \"updated_at\", \"deleted_at\" FROM \"items\" \
             WHERE \"name\"::text ILIKE $1::text AND \"kind\" = $2::item_kind AND \"deleted_at\" IS NULL \
             ORDER BY \"updated_at\" DESC, \"name\" OFFSET 20 LIMIT 10"
        );
        assert_eq!(
            q.params,
            vec![SqlValue::Text("%ab%".into()), SqlValue::Text("tool".into())]
        );
    }

    #[test]
    fn select_rejects_unknown_order_field() {
        let query = Query::default().order_by(vec![OrderBy::asc("name; DROP TABLE items")]);
        assert!(matches!(select(&ITEMS, &query), Err(StoreError::UnknownField(_))));
    }

    #[test]
    fn count_ignores_window() {
        let q = count(&ITEMS, &[Filter::IsNull("deleted_at")]).unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(\"id\") FROM \"items\" WHERE \"deleted_at\" IS NULL"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_binds_only_assigned_columns() {
        let q = insert(
            &ITEMS,
            &[("name", "hammer".into()), ("kind", "tool".into())],
        )
        .unwrap();
        assert!(q
            .sql
            .starts_with("INSERT INTO \"items\" (\"name\", \"kind\") VALUES ($1::text, $2::item_kind) RETURNING "));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_touches_and_binds_id_last() {
        let id = uuid::Uuid::new_v4();
        let q = update_by_id(&ITEMS, id.into(), &[("name", "saw".into())]).unwrap();
        assert!(q.sql.starts_with(
            "UPDATE \"items\" SET \"name\" = $1::text, \"updated_at\" = NOW() WHERE \"id\" = $2::uuid RETURNING "
        ));
        assert_eq!(q.params[1], SqlValue::Uuid(id));
    }

    #[test]
    fn update_where_places_filters_after_sets() {
        let q = update_where(
            &ITEMS,
            &[Filter::Eq("kind", "tool".into())],
            &[("deleted_at", SqlValue::Null)],
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"items\" SET \"deleted_at\" = $1::timestamptz, \"updated_at\" = NOW() WHERE \"kind\" = $2::item_kind"
        );
    }

    #[test]
    fn delete_returns_primary_key() {
        let q = delete_by_id(&ITEMS, uuid::Uuid::nil().into()).unwrap();
        assert_eq!(
            q.sql,
            "DELETE FROM \"items\" WHERE \"id\" = $1::uuid RETURNING \"id\""
        );
    }

    #[test]
    fn unknown_assignment_column_is_rejected() {
        assert!(matches!(
            insert(&ITEMS, &[("password", "x".into())]),
            Err(StoreError::UnknownField(c)) if c == "password"
        ));
    }
}
