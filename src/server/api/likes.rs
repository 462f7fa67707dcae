use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{OptionalUser, RequireUser};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::ResultResponse;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};

pub async fn create_like(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(tweet_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    // Self-likes are allowed; only duplicates are rejected.
    state
        .store
        .create_like(tweet_id, user.id)
        .map_err(|e| match e {
            Error::AlreadyExists => ApiError::conflict("already liked"),
            Error::NotFound => ApiError::not_found("Tweet not found"),
            e => ApiError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(ResultResponse::OK)))
}

/// Checks run in order: like exists, actor authenticated, actor owns the
/// like.
pub async fn delete_like(
    OptionalUser(user): OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(like_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let like = store
        .get_like(like_id)
        .api_err("Failed to get like")?
        .or_not_found("Like not found")?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if like.user_id != user.id {
        return Err(ApiError::forbidden("Like does not belong to you"));
    }

    store.delete_like(like.id).api_err("Failed to delete like")?;

    Ok(Json(ResultResponse::OK))
}
