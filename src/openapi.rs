//! OpenAPI document for the hero endpoints, served at `/openapi.json`.
//! Paths are listed under the default prefixes.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Heroes Service",
        version = env!("CARGO_PKG_VERSION"),
        description = "Hero records with soft delete; admin routes require the access_token header."
    ),
    paths(
        crate::handlers::heroes::create_hero,
        crate::handlers::heroes::get_hero,
        crate::handlers::heroes::update_hero,
        crate::handlers::heroes::patch_hero,
        crate::handlers::heroes::delete_hero,
        crate::handlers::heroes::search_heroes,
        crate::handlers::heroes::get_hero_as_staff,
        crate::handlers::heroes::delete_hero_as_staff,
        crate::handlers::heroes::search_heroes_as_staff,
    ),
    components(schemas(
        crate::entity::Hero,
        crate::entity::Role,
        crate::sql::OrderBy,
        crate::service::schemas::HeroCreate,
        crate::service::schemas::HeroUpdate,
        crate::service::schemas::HeroPatch,
        crate::service::schemas::HeroSearch,
        crate::service::schemas::HeroSearchResult,
        crate::service::schemas::StatusMessage,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "public/heroes", description = "Hero CRUD and search"),
        (name = "admin/heroes", description = "Staff access, including soft-deleted heroes"),
    )
)]
pub struct HeroesApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    HeroesApiDoc::openapi()
}
