//! Transaction boundary and error translation composed around service operations.
//!
//! Order of composition, outermost first: [`transaction`], [`ConflictExt::or_conflict`],
//! [`not_found`]. A missing row therefore commits nothing, and a constraint violation
//! surfaces as `Conflict` rather than a raw store error.

use crate::error::{AppError, StoreError};
use crate::uow::UnitOfWork;
use std::future::Future;

/// What the transaction boundary does after a successful operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Finalize {
    #[default]
    Commit,
    /// Flush only; the caller composes further work and commits itself.
    Flush,
}

/// Runs `op` and finalizes the unit of work. In commit mode a failed operation rolls it back.
pub async fn transaction<T, F>(uow: &dyn UnitOfWork, finalize: Finalize, op: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match op.await {
        Ok(value) => {
            match finalize {
                Finalize::Commit => uow.commit().await?,
                Finalize::Flush => uow.flush().await?,
            }
            Ok(value)
        }
        Err(e) => {
            if finalize == Finalize::Commit {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
            }
            Err(e)
        }
    }
}

/// Maps a missing result into `NotFound` with the given detail.
pub fn not_found<T>(found: Option<T>, detail: &str) -> Result<T, AppError> {
    found.ok_or_else(|| AppError::NotFound(detail.to_string()))
}

pub trait ConflictExt<T> {
    /// Maps a store integrity violation into `Conflict` with the given detail.
    fn or_conflict(self, detail: &str) -> Result<T, AppError>;
}

impl<T> ConflictExt<T> for Result<T, StoreError> {
    fn or_conflict(self, detail: &str) -> Result<T, AppError> {
        self.map_err(AppError::Store).or_conflict(detail)
    }
}

impl<T> ConflictExt<T> for Result<T, AppError> {
    fn or_conflict(self, detail: &str) -> Result<T, AppError> {
        self.map_err(|e| match e {
            AppError::Store(store) if store.is_integrity() => {
                tracing::debug!(reason = %store, "integrity violation");
                AppError::Conflict(detail.to_string())
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryUnitOfWorkProvider;
    use crate::uow::UnitOfWorkProvider;

    #[test]
    fn not_found_carries_detail() {
        let err = not_found::<u8>(None, "missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(d) if d == "missing"));
        assert_eq!(not_found(Some(3), "missing").unwrap(), 3);
    }

    #[test]
    fn integrity_becomes_conflict_and_other_errors_pass() {
        let dup: Result<(), StoreError> = Err(StoreError::Integrity("uq".into()));
        assert!(matches!(dup.or_conflict("exists"), Err(AppError::Conflict(d)) if d == "exists"));

        let other: Result<(), StoreError> = Err(StoreError::MultipleRows);
        assert!(matches!(other.or_conflict("exists"), Err(AppError::Store(StoreError::MultipleRows))));

        let nf: Result<(), AppError> = Err(AppError::NotFound("nf".into()));
        assert!(matches!(nf.or_conflict("exists"), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn commit_mode_commits_on_success() {
        let provider = MemoryUnitOfWorkProvider::new();
        let uow = provider.begin();
        let out = transaction(uow.as_ref(), Finalize::Commit, async { Ok::<_, AppError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(provider.commits(), 1);
        assert_eq!(provider.rollbacks(), 0);
    }

    #[tokio::test]
    async fn commit_mode_rolls_back_on_failure() {
        let provider = MemoryUnitOfWorkProvider::new();
        let uow = provider.begin();
        let out = transaction(uow.as_ref(), Finalize::Commit, async {
            Err::<(), _>(AppError::NotFound("nf".into()))
        })
        .await;
        assert!(matches!(out, Err(AppError::NotFound(_))));
        assert_eq!(provider.commits(), 0);
        assert_eq!(provider.rollbacks(), 1);
    }

    #[tokio::test]
    async fn flush_mode_leaves_the_transaction_open() {
        let provider = MemoryUnitOfWorkProvider::new();
        let uow = provider.begin();
        transaction(uow.as_ref(), Finalize::Flush, async { Ok::<_, AppError>(()) })
            .await
            .unwrap();
        transaction(uow.as_ref(), Finalize::Flush, async {
            Err::<(), _>(AppError::Conflict("c".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(provider.commits(), 0);
        assert_eq!(provider.rollbacks(), 0);
    }
}
