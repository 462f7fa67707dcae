use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;
use crate::types::User;

/// Request header carrying the caller's opaque API key.
///
/// The key is compared verbatim against the stored value. There is no
/// hashing, expiry, or rotation, which makes this unsuitable for anything
/// beyond test deployments.
pub const API_KEY_HEADER: &str = "api-key";

/// Extractor that requires an authenticated user.
pub struct RequireUser(pub User);

/// Extractor that resolves the API key if present but never rejects on a
/// missing or unknown key. Handlers use this when "not found" must be
/// reported before "unauthorized".
pub struct OptionalUser(pub Option<User>);

#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    UnknownKey,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AuthError::MissingKey => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationError",
                "Authentication required",
            ),
            AuthError::UnknownKey => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationError",
                "Invalid api key",
            ),
            AuthError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DatabaseError",
                "Internal server error",
            ),
        };

        let body = json!({
            "result": false,
            "error_type": error_type,
            "error_message": message,
        });

        (status, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingKey)?;

        let user = state
            .store
            .get_user_by_api_key(api_key)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::UnknownKey)?;

        Ok(RequireUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(api_key) = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
        else {
            return Ok(OptionalUser(None));
        };

        let user = state
            .store
            .get_user_by_api_key(api_key)
            .map_err(|_| AuthError::InternalError)?;

        Ok(OptionalUser(user))
    }
}
