use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory store, useful for tests and embedding.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Maps constraint violations onto domain errors so handlers can
/// distinguish duplicates and dangling references from real failures.
fn map_constraint(e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return Error::AlreadyExists;
        }
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return Error::NotFound;
        }
    }
    Error::Database(e)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        api_key: row.get(2)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, name: &str, api_key: &str) -> Result<User> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (name, api_key) VALUES (?1, ?2)",
            params![name, api_key],
        )
        .map_err(map_constraint)?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, api_key FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, api_key FROM users WHERE api_key = ?1",
            params![api_key],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    // Tweet operations

    fn create_tweet(&self, author_id: i64, content: &str, media_ids: &[i64]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO tweets (content, author_id) VALUES (?1, ?2)",
            params![content, author_id],
        )?;
        let tweet_id = tx.last_insert_rowid();

        if !media_ids.is_empty() {
            let mut attached = 0;
            {
                // INSERT..SELECT links only ids that resolve, so the row
                // count doubles as the existence check.
                let mut stmt = tx.prepare(
                    "INSERT INTO tweet_media (tweet_id, media_id)
                     SELECT ?1, id FROM media WHERE id = ?2",
                )?;
                for media_id in media_ids {
                    attached += stmt.execute(params![tweet_id, media_id])?;
                }
            }

            if attached != media_ids.len() {
                // Dropping the transaction rolls back the tweet insert.
                return Err(Error::MediaNotFound);
            }
        }

        tx.commit()?;
        Ok(tweet_id)
    }

    fn get_tweet(&self, id: i64) -> Result<Option<Tweet>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, content, author_id FROM tweets WHERE id = ?1",
            params![id],
            |row| {
                Ok(Tweet {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    author_id: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tweets(&self) -> Result<Vec<Tweet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, content, author_id FROM tweets ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Tweet {
                id: row.get(0)?,
                content: row.get(1)?,
                author_id: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_tweet(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tweets WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Like operations

    fn create_like(&self, tweet_id: i64, user_id: i64) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO likes (tweet_id, user_id) VALUES (?1, ?2)",
            params![tweet_id, user_id],
        )
        .map_err(map_constraint)?;

        Ok(conn.last_insert_rowid())
    }

    fn get_like(&self, id: i64) -> Result<Option<Like>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, tweet_id, user_id FROM likes WHERE id = ?1",
            params![id],
            |row| {
                Ok(Like {
                    id: row.get(0)?,
                    tweet_id: row.get(1)?,
                    user_id: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_like(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM likes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_tweet_likers(&self, tweet_id: i64) -> Result<Vec<User>> {
        let conn = self.conn();
        // The join drops likes whose user no longer resolves.
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.api_key FROM likes l
             JOIN users u ON u.id = l.user_id
             WHERE l.tweet_id = ?1 ORDER BY l.id",
        )?;

        let rows = stmt.query_map(params![tweet_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Subscribe operations

    fn create_subscribe(&self, subscriber_id: i64, target_id: i64) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO subscribes (subscriber_id, target_id) VALUES (?1, ?2)",
            params![subscriber_id, target_id],
        )
        .map_err(map_constraint)?;

        Ok(conn.last_insert_rowid())
    }

    fn get_subscribe(&self, subscriber_id: i64, target_id: i64) -> Result<Option<Subscribe>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, subscriber_id, target_id FROM subscribes
             WHERE subscriber_id = ?1 AND target_id = ?2",
            params![subscriber_id, target_id],
            |row| {
                Ok(Subscribe {
                    id: row.get(0)?,
                    subscriber_id: row.get(1)?,
                    target_id: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_subscribe(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM subscribes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_followers(&self, user_id: i64) -> Result<Vec<User>> {
        let conn = self.conn();
        // Most recently created edge first; the join skips edges whose
        // subscriber no longer resolves.
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.api_key FROM subscribes s
             JOIN users u ON u.id = s.subscriber_id
             WHERE s.target_id = ?1 ORDER BY s.id DESC",
        )?;

        let rows = stmt.query_map(params![user_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_following(&self, user_id: i64) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.api_key FROM subscribes s
             JOIN users u ON u.id = s.target_id
             WHERE s.subscriber_id = ?1 ORDER BY s.id DESC",
        )?;

        let rows = stmt.query_map(params![user_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Media operations

    fn create_media(&self, file_name: &str, file_path: &str) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO media (file_name, file_path) VALUES (?1, ?2)",
            params![file_name, file_path],
        )
        .map_err(map_constraint)?;

        Ok(conn.last_insert_rowid())
    }

    fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, file_name, file_path FROM media WHERE file_name = ?1",
            params![file_name],
            |row| {
                Ok(Media {
                    id: row.get(0)?,
                    file_name: row.get(1)?,
                    file_path: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tweet_media(&self, tweet_id: i64) -> Result<Vec<Media>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT m.id, m.file_name, m.file_path FROM tweet_media tm
             JOIN media m ON m.id = tm.media_id
             WHERE tm.tweet_id = ?1 ORDER BY m.id",
        )?;

        let rows = stmt.query_map(params![tweet_id], |row| {
            Ok(Media {
                id: row.get(0)?,
                file_name: row.get(1)?,
                file_path: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_duplicate_api_key() {
        let store = test_store();
        store.create_user("alice", "key-a").unwrap();

        let result = store.create_user("impostor", "key-a");
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_tweet_media_mismatch_rolls_back() {
        let store = test_store();
        let user = store.create_user("alice", "key-a").unwrap();
        let media_id = store.create_media("cat.png", "media/cat.png").unwrap();

        let result = store.create_tweet(user.id, "look at my cat", &[media_id, 9999]);
        assert!(matches!(result, Err(Error::MediaNotFound)));

        // Nothing committed: no tweet, no dangling association.
        assert!(store.list_tweets().unwrap().is_empty());

        let tweet_id = store.create_tweet(user.id, "take two", &[media_id]).unwrap();
        let attached = store.list_tweet_media(tweet_id).unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].file_path, "media/cat.png");
    }

    #[test]
    fn test_duplicate_like() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();
        let bob = store.create_user("bob", "key-b").unwrap();
        let tweet_id = store.create_tweet(alice.id, "hello", &[]).unwrap();

        store.create_like(tweet_id, bob.id).unwrap();
        let result = store.create_like(tweet_id, bob.id);
        assert!(matches!(result, Err(Error::AlreadyExists)));

        assert_eq!(store.list_tweet_likers(tweet_id).unwrap().len(), 1);
    }

    #[test]
    fn test_like_missing_tweet() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();

        let result = store.create_like(42, alice.id);
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn test_duplicate_subscribe() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();
        let bob = store.create_user("bob", "key-b").unwrap();

        store.create_subscribe(alice.id, bob.id).unwrap();
        let result = store.create_subscribe(alice.id, bob.id);
        assert!(matches!(result, Err(Error::AlreadyExists)));

        // The reverse edge is a different pair and still inserts.
        store.create_subscribe(bob.id, alice.id).unwrap();
    }

    #[test]
    fn test_follower_lists_reverse_edge_order() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();
        let bob = store.create_user("bob", "key-b").unwrap();
        let carol = store.create_user("carol", "key-c").unwrap();
        let dave = store.create_user("dave", "key-d").unwrap();

        store.create_subscribe(bob.id, alice.id).unwrap();
        store.create_subscribe(carol.id, alice.id).unwrap();
        store.create_subscribe(dave.id, alice.id).unwrap();

        let followers: Vec<String> = store
            .list_followers(alice.id)
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(followers, ["dave", "carol", "bob"]);

        store.create_subscribe(alice.id, carol.id).unwrap();
        store.create_subscribe(alice.id, dave.id).unwrap();

        let following: Vec<String> = store
            .list_following(alice.id)
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(following, ["dave", "carol"]);
    }

    #[test]
    fn test_delete_tweet_cascades() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();
        let bob = store.create_user("bob", "key-b").unwrap();
        let media_id = store.create_media("dog.png", "media/dog.png").unwrap();
        let tweet_id = store.create_tweet(alice.id, "woof", &[media_id]).unwrap();
        let like_id = store.create_like(tweet_id, bob.id).unwrap();

        assert!(store.delete_tweet(tweet_id).unwrap());

        assert!(store.get_like(like_id).unwrap().is_none());
        assert!(store.list_tweet_media(tweet_id).unwrap().is_empty());
        // Media rows survive tweet deletion.
        assert!(store.get_media_by_file_name("dog.png").unwrap().is_some());

        assert!(!store.delete_tweet(tweet_id).unwrap());
    }

    #[test]
    fn test_delete_user_cascades() {
        let store = test_store();
        let alice = store.create_user("alice", "key-a").unwrap();
        let bob = store.create_user("bob", "key-b").unwrap();
        let tweet_id = store.create_tweet(alice.id, "bye", &[]).unwrap();
        store.create_like(tweet_id, bob.id).unwrap();
        store.create_subscribe(bob.id, alice.id).unwrap();

        store
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![alice.id])
            .unwrap();

        assert!(store.get_tweet(tweet_id).unwrap().is_none());
        assert!(store.get_subscribe(bob.id, alice.id).unwrap().is_none());
    }
}
