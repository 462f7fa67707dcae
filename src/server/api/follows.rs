use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::ResultResponse;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};

pub async fn create_follow(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    if target_id == user.id {
        return Err(ApiError::bad_request("Cannot follow yourself"));
    }

    store
        .get_user(target_id)
        .api_err("Failed to get user")?
        .or_not_found("Target user not found")?;

    store
        .create_subscribe(user.id, target_id)
        .map_err(|e| match e {
            Error::AlreadyExists => ApiError::conflict("already following"),
            e => ApiError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(ResultResponse::OK)))
}

/// The edge is addressed by (actor, target), so ownership is implicit in
/// the lookup: the only reachable failures are 401 and 404.
pub async fn delete_follow(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let subscribe = store
        .get_subscribe(user.id, target_id)
        .api_err("Failed to get subscription")?
        .or_not_found("Subscription not found")?;

    store
        .delete_subscribe(subscribe.id)
        .api_err("Failed to delete subscription")?;

    Ok(StatusCode::NO_CONTENT)
}
