use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{OptionalUser, RequireUser};
use crate::server::AppState;
use crate::server::dto::{
    CreateTweetRequest, LikePayload, ResultResponse, TweetCreatedResponse, TweetListResponse,
    TweetPayload, UserRef,
};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};

pub async fn create_tweet(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTweetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.is_empty() {
        return Err(ApiError::bad_request("Tweet content is required"));
    }

    // The store attaches media in the same transaction; a tweet
    // referencing missing media is never committed.
    let tweet_id = state
        .store
        .create_tweet(user.id, &req.content, &req.media_ids)
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(TweetCreatedResponse {
            result: true,
            tweet_id,
        }),
    ))
}

/// Checks run in order: tweet exists, actor authenticated, actor owns the
/// tweet. Deleting a missing tweet reports 404 even without credentials.
pub async fn delete_tweet(
    OptionalUser(user): OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let tweet = store
        .get_tweet(id)
        .api_err("Failed to get tweet")?
        .or_not_found("Tweet not found")?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if tweet.author_id != Some(user.id) {
        return Err(ApiError::forbidden("Tweet does not belong to you"));
    }

    store.delete_tweet(tweet.id).api_err("Failed to delete tweet")?;

    Ok(Json(ResultResponse::OK))
}

pub async fn list_tweets(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let tweets = store.list_tweets().api_err("Failed to list tweets")?;

    let mut payloads = Vec::with_capacity(tweets.len());

    // Newest first: stable reversal of insertion order.
    for tweet in tweets.into_iter().rev() {
        let author = match tweet.author_id {
            Some(author_id) => store
                .get_user(author_id)
                .api_err("Failed to get author")?
                .map(|u| UserRef {
                    id: u.id,
                    name: u.name,
                }),
            None => None,
        };

        let attachments = store
            .list_tweet_media(tweet.id)
            .api_err("Failed to list attachments")?
            .into_iter()
            .map(|m| m.file_path)
            .collect();

        let likes = store
            .list_tweet_likers(tweet.id)
            .api_err("Failed to list likes")?
            .into_iter()
            .map(|u| LikePayload {
                user_id: u.id,
                name: u.name,
            })
            .collect();

        payloads.push(TweetPayload {
            id: tweet.id,
            content: tweet.content,
            attachments,
            author,
            likes,
        });
    }

    Ok(Json(TweetListResponse {
        result: true,
        tweets: payloads,
    }))
}
