//! One hero service, and so one unit of work, per request.

use crate::service::HeroService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

#[async_trait]
impl FromRequestParts<AppState> for HeroService {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(state.heroes())
    }
}
