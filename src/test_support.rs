//! In-memory unit of work for tests: same contracts as the PostgreSQL one, no database.
//!
//! Each unit of work copies the committed rows on first use and works on that copy;
//! commit publishes the copy, rollback drops it. The nickname uniqueness constraint is
//! enforced the way the table's UNIQUE index does.

use crate::entity::{Assign, Entity, Hero, HeroChanges, NewHero, HEROES};
use crate::error::StoreError;
use crate::service::Crud;
use crate::sql::{self, Filter, OrderBy, Query};
use crate::uow::{UnitOfWork, UnitOfWorkProvider};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStore {
    committed: Mutex<Vec<Hero>>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    unavailable: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hands out in-memory units of work over one shared set of committed heroes.
#[derive(Clone, Default)]
pub struct MemoryUnitOfWorkProvider {
    store: Arc<MemoryStore>,
}

impl MemoryUnitOfWorkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows visible to a fresh unit of work, in insertion order.
    pub fn committed_heroes(&self) -> Vec<Hero> {
        lock(&self.store.committed).clone()
    }

    pub fn commits(&self) -> usize {
        self.store.commits.load(AtomicOrdering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.store.rollbacks.load(AtomicOrdering::SeqCst)
    }

    /// Makes `ping` fail, as when the database is unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.store.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl UnitOfWorkProvider for MemoryUnitOfWorkProvider {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(MemoryUnitOfWork {
            heroes: Arc::new(MemoryHeroes {
                store: self.store.clone(),
                staged: Mutex::new(None),
            }),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.store.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Transaction("store unavailable".into()));
        }
        Ok(())
    }
}

struct MemoryUnitOfWork {
    heroes: Arc<MemoryHeroes>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn heroes(&self) -> Arc<dyn Crud<Hero>> {
        self.heroes.clone()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        if let Some(rows) = lock(&self.heroes.staged).take() {
            *lock(&self.heroes.store.committed) = rows;
        }
        self.heroes.store.commits.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        lock(&self.heroes.staged).take();
        self.heroes.store.rollbacks.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}

/// [`Crud`] over a staged copy of the committed heroes.
struct MemoryHeroes {
    store: Arc<MemoryStore>,
    staged: Mutex<Option<Vec<Hero>>>,
}

impl MemoryHeroes {
    fn with_rows<T>(&self, f: impl FnOnce(&mut Vec<Hero>) -> T) -> T {
        let mut staged = lock(&self.staged);
        let rows = staged.get_or_insert_with(|| lock(&self.store.committed).clone());
        f(rows)
    }
}

fn matches_all(hero: &Hero, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(&hero.value(f.column())))
}

fn compare(a: &Hero, b: &Hero, order_by: &[OrderBy]) -> Ordering {
    for o in order_by {
        let ord = a.value(&o.field).sort_cmp(&b.value(&o.field));
        let ord = if o.desc { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn nickname_taken(rows: &[Hero], nickname: &str, except: Option<Uuid>) -> bool {
    rows.iter().any(|h| h.nickname == nickname && Some(h.uuid) != except)
}

fn apply(hero: &mut Hero, changes: &HeroChanges) {
    if let Some(n) = &changes.nickname {
        hero.nickname = n.clone();
    }
    if let Some(r) = changes.role {
        hero.role = r;
    }
    if let Some(d) = changes.deleted_at {
        hero.deleted_at = d;
    }
    hero.updated_at = Utc::now();
}

fn duplicate(nickname: &str) -> StoreError {
    StoreError::Integrity(format!("duplicate key value violates unique constraint: nickname={}", nickname))
}

#[async_trait]
impl Crud<Hero> for MemoryHeroes {
    async fn get(&self, id: &Uuid) -> Result<Option<Hero>, StoreError> {
        Ok(self.with_rows(|rows| rows.iter().find(|h| h.uuid == *id).cloned()))
    }

    async fn insert(&self, new: &NewHero) -> Result<Hero, StoreError> {
        self.with_rows(|rows| {
            if nickname_taken(rows, &new.nickname, None) {
                return Err(duplicate(&new.nickname));
            }
            let now = Utc::now();
            let hero = Hero {
                uuid: Uuid::new_v4(),
                nickname: new.nickname.clone(),
                role: new.role,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            rows.push(hero.clone());
            Ok(hero)
        })
    }

    async fn select(&self, query: &Query) -> Result<Vec<Hero>, StoreError> {
        sql::check_order_by(&HEROES, &query.order_by)?;
        Ok(self.with_rows(|rows| {
            let mut found: Vec<Hero> = rows.iter().filter(|h| matches_all(h, &query.filters)).cloned().collect();
            found.sort_by(|a, b| compare(a, b, &query.order_by));
            found
                .into_iter()
                .skip(query.offset as usize)
                .take(query.limit as usize)
                .collect()
        }))
    }

    async fn select_one(&self, filters: &[Filter]) -> Result<Option<Hero>, StoreError> {
        let mut found = self.select(&Query::filtered(filters.to_vec()).window(0, 2)).await?;
        if found.len() > 1 {
            return Err(StoreError::MultipleRows);
        }
        Ok(found.pop())
    }

    async fn update(&self, id: &Uuid, changes: &HeroChanges) -> Result<Option<Hero>, StoreError> {
        if changes.is_empty() {
            return self.get(id).await;
        }
        self.with_rows(|rows| {
            if !rows.iter().any(|h| h.uuid == *id) {
                return Ok(None);
            }
            if let Some(n) = &changes.nickname {
                if nickname_taken(rows, n, Some(*id)) {
                    return Err(duplicate(n));
                }
            }
            Ok(rows.iter_mut().find(|h| h.uuid == *id).map(|hero| {
                apply(hero, changes);
                hero.clone()
            }))
        })
    }

    async fn update_many(&self, filters: &[Filter], changes: &HeroChanges) -> Result<bool, StoreError> {
        if changes.is_empty() {
            return Ok(true);
        }
        self.with_rows(|rows| {
            let targets = rows.iter().filter(|h| matches_all(h, filters)).count();
            if let (Some(n), true) = (&changes.nickname, targets > 0) {
                if targets > 1 || rows.iter().any(|h| h.nickname == *n && !matches_all(h, filters)) {
                    return Err(duplicate(n));
                }
            }
            for hero in rows.iter_mut().filter(|h| matches_all(h, filters)) {
                apply(hero, changes);
            }
            Ok(true)
        })
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<bool>, StoreError> {
        Ok(self.with_rows(|rows| {
            let before = rows.len();
            rows.retain(|h| h.uuid != *id);
            (rows.len() < before).then_some(true)
        }))
    }

    async fn count(&self, filters: &[Filter], _order_by: &[OrderBy]) -> Result<i64, StoreError> {
        Ok(self.with_rows(|rows| rows.iter().filter(|h| matches_all(h, filters)).count() as i64))
    }
}
