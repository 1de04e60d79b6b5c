//! Router assembly.

pub mod common;
pub mod heroes;

pub use common::common_routes;
pub use heroes::{admin_routes, public_routes};

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this are rejected with 413.
pub const BODY_LIMIT: usize = 64 * 1024;

/// The full application: common routes, public and admin groups under their versioned prefixes.
pub fn app(state: AppState) -> Router {
    let public = state.settings.public_v1();
    let admin = state.settings.admin_v1();
    Router::new()
        .merge(common_routes())
        .nest(&public, public_routes())
        .nest(&admin, admin_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT)),
        )
        .with_state(state)
}
