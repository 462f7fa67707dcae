mod follows;
mod likes;
pub(crate) mod medias;
mod tweets;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Tweets
        .route("/tweets", get(tweets::list_tweets))
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/{id}", delete(tweets::delete_tweet))
        // Likes
        .route("/tweets/{id}/likes", post(likes::create_like))
        .route("/tweets/{id}/likes", delete(likes::delete_like))
        // Media
        .route("/medias", post(medias::upload_media))
        // Users and follow edges
        .route("/users/me", get(users::my_profile))
        .route("/users/{id}", get(users::profile_by_id))
        .route("/users/{id}/follow", post(follows::create_follow))
        .route("/users/{id}/follow", delete(follows::delete_follow))
}
