use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,
    #[serde(default)]
    pub media_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub result: bool,
}

impl ResultResponse {
    pub const OK: ResultResponse = ResultResponse { result: true };
}

#[derive(Debug, Serialize)]
pub struct TweetCreatedResponse {
    pub result: bool,
    pub tweet_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MediaCreatedResponse {
    pub result: bool,
    pub media_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TweetListResponse {
    pub result: bool,
    pub tweets: Vec<TweetPayload>,
}

#[derive(Debug, Serialize)]
pub struct TweetPayload {
    pub id: i64,
    pub content: String,
    /// Storage paths of attached media, servable under `/{path}`.
    pub attachments: Vec<String>,
    pub author: Option<UserRef>,
    pub likes: Vec<LikePayload>,
}

/// Minimal user projection used for authors, followers, and following.
#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

/// A like entry in a tweet payload. The liker's id is keyed `user_id`
/// here, unlike `UserRef`; both shapes are part of the wire contract.
#[derive(Debug, Serialize)]
pub struct LikePayload {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub result: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
}
