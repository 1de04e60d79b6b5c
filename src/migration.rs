//! Schema bootstrap from the static table definitions: enum types, tables, indexes.
//! Every statement is idempotent, so this runs on each startup.

use crate::entity::{HEROES, ROLES};
use crate::error::StoreError;
use crate::sql::{quoted, EnumType, Table};
use sqlx::PgPool;

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `CREATE TYPE` wrapped in a DO block; PostgreSQL has no `IF NOT EXISTS` for enums.
pub fn create_enum_sql(e: &EnumType) -> String {
    let values: Vec<String> = e.values.iter().map(|v| literal(v)).collect();
    format!(
        "DO $$ BEGIN\n  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = {}) THEN\n    CREATE TYPE {} AS ENUM ({});\n  END IF;\nEND $$",
        literal(e.name),
        quoted(e.name),
        values.join(", ")
    )
}

pub fn create_table_sql(t: &Table) -> String {
    let mut defs: Vec<String> = t
        .columns
        .iter()
        .map(|c| format!("{} {}", quoted(c.name), c.definition))
        .collect();
    defs.push(format!("PRIMARY KEY ({})", quoted(t.primary_key)));
    for u in t.unique {
        let cols: Vec<String> = u.iter().map(|c| quoted(c)).collect();
        defs.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(t.name),
        defs.join(",\n  ")
    )
}

pub fn create_index_sql(t: &Table) -> Vec<String> {
    t.indexed
        .iter()
        .map(|col| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING btree ({})",
                quoted(&format!("ix_{}_{}", t.name, col)),
                quoted(t.name),
                quoted(col)
            )
        })
        .collect()
}

/// Creates the hero schema if missing.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    ensure_schema(pool, &[&ROLES], &[&HEROES]).await
}

pub async fn ensure_schema(pool: &PgPool, enums: &[&EnumType], tables: &[&Table]) -> Result<(), StoreError> {
    for e in enums {
        sqlx::query(&create_enum_sql(e)).execute(pool).await?;
    }
    for t in tables {
        sqlx::query(&create_table_sql(t)).execute(pool).await?;
        for sql in create_index_sql(t) {
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::info!(table = t.name, "table ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_creation_is_guarded() {
        let sql = create_enum_sql(&ROLES);
        assert!(sql.contains("typname = 'hrs_roles'"));
        assert!(sql.contains(r#"CREATE TYPE "hrs_roles" AS ENUM ('mage', 'assassin', 'warrior', 'priest', 'tank')"#));
    }

    #[test]
    fn hero_table_ddl() {
        let sql = create_table_sql(&HEROES);
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "hrs_heroes""#));
        assert!(sql.contains(r#""nickname" VARCHAR(255) NOT NULL"#));
        assert!(sql.contains(r#""deleted_at" TIMESTAMPTZ"#));
        assert!(sql.contains(r#"PRIMARY KEY ("uuid")"#));
        assert!(sql.contains(r#"UNIQUE ("nickname")"#));
    }

    #[test]
    fn nickname_gets_an_index() {
        assert_eq!(
            create_index_sql(&HEROES),
            vec![r#"CREATE INDEX IF NOT EXISTS "ix_hrs_heroes_nickname" ON "hrs_heroes" USING btree ("nickname")"#.to_string()]
        );
    }

    #[test]
    fn literals_escape_quotes() {
        assert_eq!(literal("o'neil"), "'o''neil'");
    }
}
