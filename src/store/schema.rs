pub const SCHEMA: &str = r#"
-- Users are created by startup bootstrap only; the api_key is the
-- opaque bearer credential looked up on every authenticated request
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    api_key TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS tweets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    author_id INTEGER REFERENCES users(id) ON DELETE CASCADE
);

-- One like per user per tweet
CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tweet_id INTEGER NOT NULL REFERENCES tweets(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,

    UNIQUE(tweet_id, user_id)
);

-- Follow edges: subscriber follows target, one edge per ordered pair.
-- Self-follows are rejected at the handler level, not here.
CREATE TABLE IF NOT EXISTS subscribes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subscriber_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    target_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,

    UNIQUE(subscriber_id, target_id)
);

-- Uploaded files, deduplicated by original filename. Rows are never
-- deleted; orphaned media persists.
CREATE TABLE IF NOT EXISTS media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name TEXT NOT NULL UNIQUE,
    file_path TEXT NOT NULL
);

-- Many-to-many relationship between tweets and media
CREATE TABLE IF NOT EXISTS tweet_media (
    tweet_id INTEGER NOT NULL REFERENCES tweets(id) ON DELETE CASCADE,
    media_id INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
    PRIMARY KEY (tweet_id, media_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_tweets_author ON tweets(author_id);
CREATE INDEX IF NOT EXISTS idx_likes_tweet ON likes(tweet_id);
CREATE INDEX IF NOT EXISTS idx_likes_user ON likes(user_id);
CREATE INDEX IF NOT EXISTS idx_subscribes_subscriber ON subscribes(subscriber_id);
CREATE INDEX IF NOT EXISTS idx_subscribes_target ON subscribes(target_id);
CREATE INDEX IF NOT EXISTS idx_tweet_media_media ON tweet_media(media_id);
"#;
