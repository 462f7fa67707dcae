mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, name: &str, api_key: &str) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_api_key(&self, api_key: &str) -> Result<Option<User>>;

    // Tweet operations
    //
    // `create_tweet` attaches the given media ids inside the same
    // transaction; if any id does not resolve the whole insert rolls
    // back with `Error::MediaNotFound`.
    fn create_tweet(&self, author_id: i64, content: &str, media_ids: &[i64]) -> Result<i64>;
    fn get_tweet(&self, id: i64) -> Result<Option<Tweet>>;
    fn list_tweets(&self) -> Result<Vec<Tweet>>;
    fn delete_tweet(&self, id: i64) -> Result<bool>;

    // Like operations
    fn create_like(&self, tweet_id: i64, user_id: i64) -> Result<i64>;
    fn get_like(&self, id: i64) -> Result<Option<Like>>;
    fn delete_like(&self, id: i64) -> Result<bool>;
    fn list_tweet_likers(&self, tweet_id: i64) -> Result<Vec<User>>;

    // Subscribe (follow edge) operations
    fn create_subscribe(&self, subscriber_id: i64, target_id: i64) -> Result<i64>;
    fn get_subscribe(&self, subscriber_id: i64, target_id: i64) -> Result<Option<Subscribe>>;
    fn delete_subscribe(&self, id: i64) -> Result<bool>;
    fn list_followers(&self, user_id: i64) -> Result<Vec<User>>;
    fn list_following(&self, user_id: i64) -> Result<Vec<User>>;

    // Media operations
    fn create_media(&self, file_name: &str, file_path: &str) -> Result<i64>;
    fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>>;
    fn list_tweet_media(&self, tweet_id: i64) -> Result<Vec<Media>>;
}
