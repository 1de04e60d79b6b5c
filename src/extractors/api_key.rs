//! API key check for admin routes.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the admin API key.
pub const API_KEY_HEADER: &str = "access_token";
pub const FORBIDDEN: &str = "Access is forbidden!";

/// Compares every byte regardless of where the first mismatch is.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Proof that the request carried the configured API key.
#[derive(Clone, Copy, Debug)]
pub struct StaffAccess;

#[async_trait]
impl FromRequestParts<AppState> for StaffAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        match presented {
            Some(key) if keys_match(key, &state.settings.security.api_key) => Ok(StaffAccess),
            Some(_) => {
                tracing::warn!(path = %parts.uri.path(), "rejected admin request: wrong api key");
                Err(AppError::Forbidden(FORBIDDEN.into()))
            }
            None => {
                tracing::warn!(path = %parts.uri.path(), "rejected admin request: no api key");
                Err(AppError::Forbidden(FORBIDDEN.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_only_on_identical_bytes() {
        assert!(keys_match("s3cret", "s3cret"));
        assert!(!keys_match("s3cres", "s3cret"));
        assert!(!keys_match("s3cre", "s3cret"));
        assert!(!keys_match("", "s3cret"));
    }
}
