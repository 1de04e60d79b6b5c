//! Hero route groups. Mounted under the versioned public and admin prefixes.

use crate::handlers::heroes::{
    create_hero, delete_hero, delete_hero_as_staff, get_hero, get_hero_as_staff, patch_hero,
    search_heroes, search_heroes_as_staff, update_hero,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/heroes", post(create_hero))
        .route("/heroes/search", post(search_heroes))
        .route(
            "/heroes/:id",
            get(get_hero).put(update_hero).patch(patch_hero).delete(delete_hero),
        )
}

/// Every handler here requires [`crate::extractors::StaffAccess`].
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/heroes/search", post(search_heroes_as_staff))
        .route("/heroes/:id", get(get_hero_as_staff).delete(delete_hero_as_staff))
}
