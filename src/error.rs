use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("one or more media files were not found")]
    MediaNotFound,
}

impl Error {
    /// Classification label exposed in `error_type` fields of error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Database(_) => "DatabaseError",
            Error::NotFound => "NotFoundError",
            Error::AlreadyExists => "ConflictError",
            Error::MediaNotFound => "MediaNotFoundError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
