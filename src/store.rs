//! Database connection: create the target database if missing, then open the pool.

use crate::config::PostgresSettings;
use crate::error::StoreError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Connects to the `postgres` maintenance database on the same server and creates the
/// database named in `dsn` when it does not exist yet.
pub async fn ensure_database_exists(dsn: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = split_db_name(dsn)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn = opts.connect().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

pub async fn connect(settings: &PostgresSettings) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.dsn)
        .await?;
    Ok(pool)
}

/// Splits a DSN into the maintenance-database URL and the target database name.
fn split_db_name(url: &str) -> Result<(String, String), StoreError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = match url[scheme_end..].find('/') {
        Some(i) => scheme_end + i + 1,
        None => {
            return Err(StoreError::Database(sqlx::Error::Configuration(
                "POSTGRESQL_DSN has no database path".into(),
            )))
        }
    };
    let (base, rest) = url.split_at(path_start);
    let (db_name, query) = match rest.split_once('?') {
        Some((db, q)) => (db.trim(), format!("?{}", q)),
        None => (rest.trim(), String::new()),
    };
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_from_dsn() {
        let (admin, db) = split_db_name("postgres://user:pw@localhost:5432/heroes").unwrap();
        assert_eq!(admin, "postgres://user:pw@localhost:5432/postgres");
        assert_eq!(db, "heroes");
    }

    #[test]
    fn keeps_query_parameters_on_the_admin_url() {
        let (admin, db) = split_db_name("postgresql://h/heroes?sslmode=disable").unwrap();
        assert_eq!(admin, "postgresql://h/postgres?sslmode=disable");
        assert_eq!(db, "heroes");
    }

    #[test]
    fn dsn_without_path_is_an_error() {
        assert!(split_db_name("postgres://localhost").is_err());
    }

    #[test]
    fn identifiers_double_embedded_quotes() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }
}
