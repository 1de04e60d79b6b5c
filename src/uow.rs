//! Unit of work: one request's transaction scope and the repositories bound to it.

use crate::entity::Hero;
use crate::error::StoreError;
use crate::service::{Crud, PgCrud};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Repositories sharing one transaction, plus its commit/rollback controls.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn heroes(&self) -> Arc<dyn Crud<Hero>>;

    /// Pushes pending writes to the store without ending the transaction.
    async fn flush(&self) -> Result<(), StoreError>;

    async fn commit(&self) -> Result<(), StoreError>;

    async fn rollback(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    /// Opens a new unit of work. Nothing touches the store until the first statement.
    fn begin(&self) -> Box<dyn UnitOfWork>;

    /// Round trip to the store for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub type TxSlot = Option<Transaction<'static, Postgres>>;

/// The open transaction inside a locked slot.
pub fn open_connection(slot: &mut TxSlot) -> Result<&mut PgConnection, StoreError> {
    slot.as_mut()
        .map(|tx| &mut **tx)
        .ok_or_else(|| StoreError::Transaction("no open transaction".into()))
}

/// A pooled connection's transaction, begun lazily on first use and begun again after
/// each commit or rollback.
pub struct PgSession {
    pool: PgPool,
    tx: Mutex<TxSlot>,
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        PgSession {
            pool,
            tx: Mutex::new(None),
        }
    }

    /// Locks the slot, beginning a transaction if none is open.
    pub async fn connection(&self) -> Result<MutexGuard<'_, TxSlot>, StoreError> {
        let mut slot = self.tx.lock().await;
        if slot.is_none() {
            *slot = Some(self.pool.begin().await?);
            tracing::debug!("transaction begun");
        }
        Ok(slot)
    }

    pub async fn commit(&self) -> Result<(), StoreError> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.commit().await?;
            tracing::debug!("transaction committed");
        }
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), StoreError> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.rollback().await?;
            tracing::debug!("transaction rolled back");
        }
        Ok(())
    }
}

pub struct PgUnitOfWork {
    session: Arc<PgSession>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn heroes(&self) -> Arc<dyn Crud<Hero>> {
        Arc::new(PgCrud::<Hero>::new(self.session.clone()))
    }

    async fn flush(&self) -> Result<(), StoreError> {
        // Statements run as soon as they are issued; there is nothing buffered.
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        self.session.commit().await
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        self.session.rollback().await
    }
}

#[derive(Clone, Debug)]
pub struct PgUnitOfWorkProvider {
    pool: PgPool,
}

impl PgUnitOfWorkProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkProvider for PgUnitOfWorkProvider {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(PgUnitOfWork {
            session: Arc::new(PgSession::new(self.pool.clone())),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
