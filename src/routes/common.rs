//! Common routes: health, readiness, version, root and the OpenAPI document.

use crate::openapi;
use crate::service::schemas::StatusMessage;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<StatusMessage> {
    Json(StatusMessage::ok(format!(
        "The service {} is running!",
        state.settings.app.title
    )))
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if let Err(e) = state.uow.ping().await {
        tracing::warn!(error = %e, "readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: "unavailable",
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: "ok",
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": state.settings.app.title,
        "openapi": "/openapi.json"
    }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi::openapi())
}

pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health_check", get(health_check))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/openapi.json", get(openapi_json))
}
