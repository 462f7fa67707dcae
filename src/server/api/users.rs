use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{UserProfile, UserRef, UserResponse};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::store::Store;
use crate::types::User;

/// Builds the profile payload shared by the `/users/me` and
/// `/users/{id}` variants. Both lists are most-recent-edge-first; edges
/// whose other side no longer resolves are skipped.
fn build_profile(store: &dyn Store, user: &User) -> Result<UserProfile, ApiError> {
    let followers = store
        .list_followers(user.id)
        .api_err("Failed to list followers")?
        .into_iter()
        .map(|u| UserRef {
            id: u.id,
            name: u.name,
        })
        .collect();

    let following = store
        .list_following(user.id)
        .api_err("Failed to list following")?
        .into_iter()
        .map(|u| UserRef {
            id: u.id,
            name: u.name,
        })
        .collect();

    Ok(UserProfile {
        id: user.id,
        name: user.name.clone(),
        followers,
        following,
    })
}

pub async fn my_profile(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = build_profile(state.store.as_ref(), &user)?;

    Ok(Json(UserResponse {
        result: true,
        user: profile,
    }))
}

pub async fn profile_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let user = store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let profile = build_profile(store, &user)?;

    Ok(Json(UserResponse {
        result: true,
        user: profile,
    }))
}
