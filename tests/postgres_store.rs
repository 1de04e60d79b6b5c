//! Hero service against a real PostgreSQL server.
//!
//! Runs only when `HEROES_TEST_DSN` names a reachable server; the database is created and
//! migrated on first use. Every test scopes its rows with a random nickname prefix, so
//! the tests share one database without interfering.

use heroes_api::service::schemas::{HeroCreate, HeroPatch, HeroSearch, HeroWrite};
use heroes_api::service::{Crud, HeroFilters, HERO_EXISTS};
use heroes_api::{
    apply_migrations, ensure_database_exists, AppError, Audience, HeroService, PgUnitOfWorkProvider, Role,
    StoreError, UnitOfWorkProvider,
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;
use uuid::Uuid;

const DSN_VAR: &str = "HEROES_TEST_DSN";

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn provider() -> Option<PgUnitOfWorkProvider> {
    let Some(dsn) = std::env::var(DSN_VAR).ok().filter(|d| !d.is_empty()) else {
        eprintln!("SKIP-TEST-DATABASE: {DSN_VAR} is not set");
        return None;
    };
    SCHEMA
        .get_or_try_init(|| async {
            ensure_database_exists(&dsn).await?;
            let pool = PgPoolOptions::new().max_connections(1).connect(&dsn).await?;
            apply_migrations(&pool).await
        })
        .await
        .expect("prepare test database");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&dsn)
        .await
        .expect("connect to test database");
    Some(PgUnitOfWorkProvider::new(pool))
}

fn service(provider: &PgUnitOfWorkProvider) -> HeroService {
    HeroService::new(provider.begin())
}

fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn hero(nickname: &str, role: Role) -> HeroCreate {
    HeroCreate {
        nickname: nickname.into(),
        role,
    }
}

async fn count_matching(provider: &PgUnitOfWorkProvider, needle: &str, audience: Audience) -> i64 {
    let criteria = HeroSearch {
        nickname: Some(needle.into()),
        ..HeroSearch::default()
    };
    let (count, items) = service(provider).search(criteria, audience).await.unwrap();
    assert_eq!(count, items.len() as i64);
    count
}

#[tokio::test]
async fn duplicate_nickname_is_a_conflict() {
    let Some(provider) = provider().await else { return };
    let nickname = format!("{}-Zeus", tag());

    let created = service(&provider).create(hero(&nickname, Role::Mage)).await.unwrap();
    assert_eq!(created.role, Role::Mage);
    assert!(created.deleted_at.is_none());

    let err = service(&provider).create(hero(&nickname, Role::Tank)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref d) if d == HERO_EXISTS), "{err:?}");
    assert_eq!(count_matching(&provider, &nickname, Audience::Staff).await, 1);
}

#[tokio::test]
async fn rename_onto_taken_nickname_leaves_the_row_unchanged() {
    let Some(provider) = provider().await else { return };
    let t = tag();
    let first = service(&provider).create(hero(&format!("{t}-Apollo"), Role::Mage)).await.unwrap();
    let second = service(&provider).create(hero(&format!("{t}-Artemis"), Role::Assassin)).await.unwrap();

    let rename = HeroWrite::Patch(HeroPatch {
        nickname: Some(first.nickname.clone()),
        role: Some(Role::Priest),
    });
    let err = service(&provider).update(second.uuid, rename).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");

    let unchanged = service(&provider).get(second.uuid, Audience::Staff).await.unwrap();
    assert_eq!(unchanged.nickname, second.nickname);
    assert_eq!(unchanged.role, Role::Assassin);
}

#[tokio::test]
async fn search_needle_wildcards_match_literally() {
    let Some(provider) = provider().await else { return };
    let t = tag();
    for nickname in ["50%off", "50xoff", "a_b", "axb", "Manta", "Batman"] {
        service(&provider)
            .create(hero(&format!("{t}{nickname}"), Role::Warrior))
            .await
            .unwrap();
    }

    assert_eq!(count_matching(&provider, &format!("{t}50%"), Audience::Public).await, 1);
    assert_eq!(count_matching(&provider, &format!("{t}a_b"), Audience::Public).await, 1);
    assert_eq!(count_matching(&provider, &format!("{t}MANTA"), Audience::Public).await, 1);
    assert_eq!(count_matching(&provider, &t, Audience::Public).await, 6);
}

#[tokio::test]
async fn soft_delete_hides_from_public_and_permanent_delete_removes() {
    let Some(provider) = provider().await else { return };
    let nickname = format!("{}-Hades", tag());
    let created = service(&provider).create(hero(&nickname, Role::Tank)).await.unwrap();

    assert!(service(&provider).delete(created.uuid, false).await.unwrap());
    let err = service(&provider).get(created.uuid, Audience::Public).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let seen = service(&provider).get(created.uuid, Audience::Staff).await.unwrap();
    assert!(seen.is_deleted());
    assert_eq!(count_matching(&provider, &nickname, Audience::Public).await, 0);
    assert_eq!(count_matching(&provider, &nickname, Audience::Staff).await, 1);

    assert!(service(&provider).delete(created.uuid, true).await.unwrap());
    let err = service(&provider).get(created.uuid, Audience::Staff).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = service(&provider).delete(created.uuid, true).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(service(&provider)
        .delete_or_none(created.uuid, false)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn dropped_unit_of_work_leaves_no_row() {
    let Some(provider) = provider().await else { return };
    let t = tag();

    let pending = service(&provider).deferred();
    let created = pending.create(hero(&format!("{t}-Ghost"), Role::Mage)).await.unwrap();
    assert!(pending.get_or_none(created.uuid, Audience::Staff).await.unwrap().is_some());
    drop(pending);
    assert!(service(&provider)
        .get_or_none(created.uuid, Audience::Staff)
        .await
        .unwrap()
        .is_none());

    let committed = service(&provider).deferred();
    let kept = committed.create(hero(&format!("{t}-Kept"), Role::Mage)).await.unwrap();
    committed.commit().await.unwrap();
    assert!(service(&provider).get_or_none(kept.uuid, Audience::Staff).await.unwrap().is_some());
}

#[tokio::test]
async fn select_one_rejects_multiple_matches() {
    let Some(provider) = provider().await else { return };
    let t = tag();
    for nickname in ["Castor", "Pollux"] {
        service(&provider)
            .create(hero(&format!("{t}-{nickname}"), Role::Warrior))
            .await
            .unwrap();
    }

    let uow = provider.begin();
    let filters = HeroFilters::new().nickname(Some(&t)).visible_to(Audience::Staff);
    let err = uow.heroes().select_one(&filters).await.unwrap_err();
    assert!(matches!(err, StoreError::MultipleRows), "{err:?}");
}
