//! Generic CRUD over any [`Entity`], executed inside a unit of work's transaction.

use crate::entity::{Assign, Entity};
use crate::error::StoreError;
use crate::sql::{self, Filter, OrderBy, Query, QueryBuf};
use crate::uow::{open_connection, PgSession};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Table-agnostic data access. Every write is executed immediately, so later reads in the
/// same unit of work observe it.
#[async_trait]
pub trait Crud<E: Entity>: Send + Sync {
    /// Point lookup by identifier; missing rows are `None`.
    async fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError>;

    /// Persists a new row and returns it with store-generated defaults filled in.
    async fn insert(&self, new: &E::New) -> Result<E, StoreError>;

    async fn select(&self, query: &Query) -> Result<Vec<E>, StoreError>;

    /// Zero or one match; more than one is an error.
    async fn select_one(&self, filters: &[Filter]) -> Result<Option<E>, StoreError>;

    /// Applies `changes` to the row with `id`; `None` when there is no such row.
    async fn update(&self, id: &E::Id, changes: &E::Changes) -> Result<Option<E>, StoreError>;

    /// Applies `changes` to every matching row without checking that any exist.
    async fn update_many(&self, filters: &[Filter], changes: &E::Changes) -> Result<bool, StoreError>;

    /// Removes the row with `id`; `None` when there is no such row.
    async fn delete(&self, id: &E::Id) -> Result<Option<bool>, StoreError>;

    async fn count(&self, filters: &[Filter], order_by: &[OrderBy]) -> Result<i64, StoreError>;

    /// Count of all matches alongside one page of them. Two independent reads: under
    /// concurrent writes the count and the page can disagree.
    async fn select_with_count(&self, query: &Query) -> Result<(i64, Vec<E>), StoreError> {
        let count = self.count(&query.filters, &query.order_by).await?;
        let items = self.select(query).await?;
        Ok((count, items))
    }
}

/// [`Crud`] against PostgreSQL through the session's transaction.
pub struct PgCrud<E> {
    session: Arc<PgSession>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgCrud<E> {
    pub fn new(session: Arc<PgSession>) -> Self {
        PgCrud {
            session,
            _entity: PhantomData,
        }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<E>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let mut slot = self.session.connection().await?;
        Ok(query.fetch_optional(open_connection(&mut slot)?).await?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<E>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let mut slot = self.session.connection().await?;
        Ok(query.fetch_all(open_connection(&mut slot)?).await?)
    }
}

#[async_trait]
impl<E: Entity> Crud<E> for PgCrud<E> {
    async fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let q = sql::select_by_id(E::TABLE, id.clone().into())?;
        self.fetch_optional(&q).await
    }

    async fn insert(&self, new: &E::New) -> Result<E, StoreError> {
        let q = sql::insert(E::TABLE, &new.assignments())?;
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn select(&self, query: &Query) -> Result<Vec<E>, StoreError> {
        let q = sql::select(E::TABLE, query)?;
        self.fetch_all(&q).await
    }

    async fn select_one(&self, filters: &[Filter]) -> Result<Option<E>, StoreError> {
        let query = Query::filtered(filters.to_vec()).window(0, 2);
        let mut rows = self.select(&query).await?;
        if rows.len() > 1 {
            return Err(StoreError::MultipleRows);
        }
        Ok(rows.pop())
    }

    async fn update(&self, id: &E::Id, changes: &E::Changes) -> Result<Option<E>, StoreError> {
        let values = changes.assignments();
        if values.is_empty() {
            return self.get(id).await;
        }
        let q = sql::update_by_id(E::TABLE, id.clone().into(), &values)?;
        self.fetch_optional(&q).await
    }

    async fn update_many(&self, filters: &[Filter], changes: &E::Changes) -> Result<bool, StoreError> {
        let values = changes.assignments();
        if values.is_empty() {
            return Ok(true);
        }
        let q = sql::update_where(E::TABLE, filters, &values)?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let mut slot = self.session.connection().await?;
        let done = query.execute(open_connection(&mut slot)?).await?;
        tracing::debug!(rows = done.rows_affected(), table = E::TABLE.name, "bulk update");
        Ok(true)
    }

    async fn delete(&self, id: &E::Id) -> Result<Option<bool>, StoreError> {
        let q = sql::delete_by_id(E::TABLE, id.clone().into())?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let mut slot = self.session.connection().await?;
        let row = query.fetch_optional(open_connection(&mut slot)?).await?;
        Ok(row.map(|_| true))
    }

    async fn count(&self, filters: &[Filter], _order_by: &[OrderBy]) -> Result<i64, StoreError> {
        // Ordering does not change a count.
        let q = sql::count(E::TABLE, filters)?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let mut slot = self.session.connection().await?;
        Ok(query.fetch_one(open_connection(&mut slot)?).await?)
    }
}
