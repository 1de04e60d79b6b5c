//! Hero operations: soft delete, staff visibility and search on top of [`Crud`].

use crate::entity::{Hero, HeroChanges, NewHero, Role};
use crate::error::AppError;
use crate::service::crud::Crud;
use crate::service::guard::{not_found, transaction, ConflictExt, Finalize};
use crate::service::schemas::{HeroCreate, HeroSearch, HeroWrite};
use crate::service::validation::Validate;
use crate::sql::{Filter, Query};
use crate::uow::UnitOfWork;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const HERO_EXISTS: &str = "The hero already exists!";
pub const HERO_NOT_FOUND: &str = "The hero hasn't been found!";
pub const HERO_DELETED: &str = "The hero has been deleted!";

/// Who is asking. Staff also sees soft-deleted heroes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    Public,
    Staff,
}

/// Filter list for hero lookups. The visibility predicate is appended last, in one place.
#[derive(Clone, Debug, Default)]
pub struct HeroFilters {
    filters: Vec<Filter>,
}

impl HeroFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.filters.push(Filter::Eq("uuid", id.into()));
        self
    }

    /// Case-insensitive substring; empty needles are ignored.
    pub fn nickname(mut self, needle: Option<&str>) -> Self {
        if let Some(n) = needle.filter(|n| !n.is_empty()) {
            self.filters.push(Filter::Contains("nickname", n.to_string()));
        }
        self
    }

    pub fn role(mut self, role: Option<Role>) -> Self {
        if let Some(r) = role {
            self.filters.push(Filter::Eq("role", r.into()));
        }
        self
    }

    pub fn visible_to(mut self, audience: Audience) -> Vec<Filter> {
        if audience == Audience::Public {
            self.filters.push(Filter::IsNull("deleted_at"));
        }
        self.filters
    }
}

/// Per-request hero operations over one unit of work.
pub struct HeroService {
    uow: Box<dyn UnitOfWork>,
    heroes: Arc<dyn Crud<Hero>>,
    finalize: Finalize,
}

impl HeroService {
    pub fn new(uow: Box<dyn UnitOfWork>) -> Self {
        let heroes = uow.heroes();
        HeroService {
            uow,
            heroes,
            finalize: Finalize::Commit,
        }
    }

    /// Writes flush instead of committing; the caller finishes with [`HeroService::commit`].
    pub fn deferred(mut self) -> Self {
        self.finalize = Finalize::Flush;
        self
    }

    pub async fn commit(&self) -> Result<(), AppError> {
        Ok(self.uow.commit().await?)
    }

    pub async fn rollback(&self) -> Result<(), AppError> {
        Ok(self.uow.rollback().await?)
    }

    pub async fn create(&self, input: HeroCreate) -> Result<Hero, AppError> {
        input.validate()?;
        let new: NewHero = input.into();
        transaction(self.uow.as_ref(), self.finalize, async {
            self.heroes.insert(&new).await.or_conflict(HERO_EXISTS)
        })
        .await
    }

    pub async fn get(&self, id: Uuid, audience: Audience) -> Result<Hero, AppError> {
        not_found(self.get_or_none(id, audience).await?, HERO_NOT_FOUND)
    }

    pub async fn get_or_none(&self, id: Uuid, audience: Audience) -> Result<Option<Hero>, AppError> {
        let filters = HeroFilters::new().id(id).visible_to(audience);
        Ok(self.heroes.select_one(&filters).await?)
    }

    pub async fn update(&self, id: Uuid, write: HeroWrite) -> Result<Hero, AppError> {
        write.validate()?;
        let changes: HeroChanges = write.into();
        transaction(self.uow.as_ref(), self.finalize, async {
            self.apply(id, &changes)
                .await
                .and_then(|found| not_found(found, HERO_NOT_FOUND))
                .or_conflict(HERO_EXISTS)
        })
        .await
    }

    pub async fn update_or_none(&self, id: Uuid, write: HeroWrite) -> Result<Option<Hero>, AppError> {
        write.validate()?;
        let changes: HeroChanges = write.into();
        transaction(self.uow.as_ref(), self.finalize, async {
            self.apply(id, &changes).await.or_conflict(HERO_EXISTS)
        })
        .await
    }

    async fn apply(&self, id: Uuid, changes: &HeroChanges) -> Result<Option<Hero>, AppError> {
        Ok(self.heroes.update(&id, changes).await?)
    }

    /// Soft delete stamps `deleted_at`; permanent delete removes the row.
    pub async fn delete(&self, id: Uuid, permanent: bool) -> Result<bool, AppError> {
        transaction(self.uow.as_ref(), self.finalize, async {
            not_found(self.remove(id, permanent).await?, HERO_NOT_FOUND)
        })
        .await
    }

    pub async fn delete_or_none(&self, id: Uuid, permanent: bool) -> Result<Option<bool>, AppError> {
        transaction(self.uow.as_ref(), self.finalize, self.remove(id, permanent)).await
    }

    async fn remove(&self, id: Uuid, permanent: bool) -> Result<Option<bool>, AppError> {
        let done = if permanent {
            self.heroes.delete(&id).await?
        } else {
            let stamp = HeroChanges::soft_delete(Utc::now());
            self.heroes.update(&id, &stamp).await?.map(|_| true)
        };
        if done.is_some() {
            tracing::info!(hero = %id, permanent, "hero deleted");
        }
        Ok(done)
    }

    /// Total match count and one page of matches.
    pub async fn search(&self, criteria: HeroSearch, audience: Audience) -> Result<(i64, Vec<Hero>), AppError> {
        criteria.validate()?;
        let filters = HeroFilters::new()
            .nickname(criteria.nickname.as_deref())
            .role(criteria.role)
            .visible_to(audience);
        let query = Query::filtered(filters)
            .order_by(criteria.order_by)
            .window(criteria.offset, criteria.limit);
        Ok(self.heroes.select_with_count(&query).await?)
    }
}
