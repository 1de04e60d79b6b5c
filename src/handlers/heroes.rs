//! Hero handlers: public CRUD and search, plus the staff variants behind the API key.

use crate::entity::Hero;
use crate::error::{AppError, ErrorBody};
use crate::extractors::StaffAccess;
use crate::response::{created, ok, status_message};
use crate::service::schemas::{
    HeroCreate, HeroPatch, HeroSearch, HeroSearchResult, HeroUpdate, HeroWrite, StatusMessage,
};
use crate::service::{Audience, HeroService, HERO_DELETED};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest(format!("invalid hero id: {}", id)))
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    /// Remove the row instead of stamping `deleted_at`.
    #[serde(default)]
    pub permanent: bool,
}

#[utoipa::path(
    post,
    path = "/public/v1/heroes",
    tag = "public/heroes",
    request_body = HeroCreate,
    responses(
        (status = 201, description = "Hero created", body = Hero),
        (status = 409, description = "Nickname taken", body = ErrorBody),
        (status = 422, description = "Invalid body", body = ErrorBody),
    )
)]
pub async fn create_hero(
    heroes: HeroService,
    body: Result<Json<HeroCreate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body?;
    let hero = heroes.create(input).await?;
    tracing::info!(hero = %hero.uuid, "hero created");
    Ok(created(hero))
}

#[utoipa::path(
    get,
    path = "/public/v1/heroes/{id}",
    tag = "public/heroes",
    params(("id" = Uuid, Path, description = "Hero id")),
    responses(
        (status = 200, description = "Hero", body = Hero),
        (status = 404, description = "Unknown or deleted", body = ErrorBody),
    )
)]
pub async fn get_hero(heroes: HeroService, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(ok(heroes.get(id, Audience::Public).await?))
}

#[utoipa::path(
    put,
    path = "/public/v1/heroes/{id}",
    tag = "public/heroes",
    params(("id" = Uuid, Path, description = "Hero id")),
    request_body = HeroUpdate,
    responses(
        (status = 200, description = "Hero replaced", body = Hero),
        (status = 404, description = "Unknown hero", body = ErrorBody),
        (status = 409, description = "Nickname taken", body = ErrorBody),
    )
)]
pub async fn update_hero(
    heroes: HeroService,
    Path(id): Path<String>,
    body: Result<Json<HeroUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    Ok(ok(heroes.update(id, HeroWrite::Replace(input)).await?))
}

#[utoipa::path(
    patch,
    path = "/public/v1/heroes/{id}",
    tag = "public/heroes",
    params(("id" = Uuid, Path, description = "Hero id")),
    request_body = HeroPatch,
    responses(
        (status = 200, description = "Hero patched", body = Hero),
        (status = 404, description = "Unknown hero", body = ErrorBody),
        (status = 409, description = "Nickname taken", body = ErrorBody),
    )
)]
pub async fn patch_hero(
    heroes: HeroService,
    Path(id): Path<String>,
    body: Result<Json<HeroPatch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    Ok(ok(heroes.update(id, HeroWrite::Patch(input)).await?))
}

#[utoipa::path(
    delete,
    path = "/public/v1/heroes/{id}",
    tag = "public/heroes",
    params(("id" = Uuid, Path, description = "Hero id")),
    responses(
        (status = 200, description = "Hero soft-deleted", body = StatusMessage),
        (status = 404, description = "Unknown hero", body = ErrorBody),
    )
)]
pub async fn delete_hero(heroes: HeroService, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    heroes.delete(id, false).await?;
    Ok(status_message(HERO_DELETED))
}

#[utoipa::path(
    post,
    path = "/public/v1/heroes/search",
    tag = "public/heroes",
    request_body = HeroSearch,
    responses(
        (status = 200, description = "Matching heroes", body = HeroSearchResult),
        (status = 422, description = "Invalid criteria", body = ErrorBody),
    )
)]
pub async fn search_heroes(
    heroes: HeroService,
    body: Result<Json<HeroSearch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(criteria) = body?;
    let (count, items) = heroes.search(criteria, Audience::Public).await?;
    Ok(ok(HeroSearchResult { count, items }))
}

#[utoipa::path(
    get,
    path = "/admin/v1/heroes/{id}",
    tag = "admin/heroes",
    params(
        ("id" = Uuid, Path, description = "Hero id"),
        ("access_token" = String, Header, description = "Admin API key"),
    ),
    responses(
        (status = 200, description = "Hero, deleted or not", body = Hero),
        (status = 403, description = "Bad or missing API key", body = ErrorBody),
        (status = 404, description = "Unknown hero", body = ErrorBody),
    )
)]
pub async fn get_hero_as_staff(
    _staff: StaffAccess,
    heroes: HeroService,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(ok(heroes.get(id, Audience::Staff).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/v1/heroes/{id}",
    tag = "admin/heroes",
    params(
        ("id" = Uuid, Path, description = "Hero id"),
        ("access_token" = String, Header, description = "Admin API key"),
        DeleteParams,
    ),
    responses(
        (status = 200, description = "Hero deleted", body = StatusMessage),
        (status = 403, description = "Bad or missing API key", body = ErrorBody),
        (status = 404, description = "Unknown hero", body = ErrorBody),
    )
)]
pub async fn delete_hero_as_staff(
    _staff: StaffAccess,
    heroes: HeroService,
    Path(id): Path<String>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Query(params) = params?;
    heroes.delete(id, params.permanent).await?;
    Ok(status_message(HERO_DELETED))
}

#[utoipa::path(
    post,
    path = "/admin/v1/heroes/search",
    tag = "admin/heroes",
    params(("access_token" = String, Header, description = "Admin API key")),
    request_body = HeroSearch,
    responses(
        (status = 200, description = "Matching heroes, deleted included", body = HeroSearchResult),
        (status = 403, description = "Bad or missing API key", body = ErrorBody),
    )
)]
pub async fn search_heroes_as_staff(
    _staff: StaffAccess,
    heroes: HeroService,
    body: Result<Json<HeroSearch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(criteria) = body?;
    let (count, items) = heroes.search(criteria, Audience::Staff).await?;
    Ok(ok(HeroSearchResult { count, items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_bad_requests() {
        assert!(matches!(parse_id("not-a-uuid"), Err(AppError::BadRequest(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
