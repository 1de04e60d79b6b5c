//! Response helpers shared by the handlers.

use crate::service::schemas::StatusMessage;
use axum::{http::StatusCode, Json};
use serde::Serialize;

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

/// `{"status": true, "message": ...}`
pub fn status_message(message: &str) -> (StatusCode, Json<StatusMessage>) {
    ok(StatusMessage::ok(message))
}
