use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum MediaStorageError {
    #[error("file not found")]
    NotFound,
    #[error("invalid file name")]
    InvalidFileName,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaStorageError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

/// Filesystem-backed storage for uploaded media, keyed by original
/// filename. Two uploads sharing a name share a file; content is never
/// hashed or inspected.
pub struct MediaStorage {
    base_path: PathBuf,
}

impl MediaStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("media"),
        }
    }

    /// Relative path recorded in the database and echoed to clients as a
    /// tweet attachment.
    #[must_use]
    pub fn storage_path(file_name: &str) -> String {
        format!("media/{file_name}")
    }

    fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    pub async fn exists(&self, file_name: &str) -> Result<bool, MediaStorageError> {
        validate_file_name(file_name)?;
        Ok(self.file_path(file_name).exists())
    }

    pub async fn save(&self, file_name: &str, data: &[u8]) -> Result<(), MediaStorageError> {
        validate_file_name(file_name)?;
        fs::create_dir_all(&self.base_path).await?;

        let temp_path = self.base_path.join(format!(".{file_name}.tmp"));
        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        fs::rename(&temp_path, self.file_path(file_name)).await?;

        Ok(())
    }

    pub async fn open(&self, file_name: &str) -> Result<(File, i64), MediaStorageError> {
        validate_file_name(file_name)?;
        let file = File::open(self.file_path(file_name))
            .await
            .map_err(MediaStorageError::from_io)?;

        let metadata = file.metadata().await?;
        let size = metadata.len() as i64;

        Ok((file, size))
    }
}

fn validate_file_name(name: &str) -> Result<(), MediaStorageError> {
    if name.is_empty() || name.len() > 255 {
        return Err(MediaStorageError::InvalidFileName);
    }

    if name == "." || name == ".." {
        return Err(MediaStorageError::InvalidFileName);
    }

    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(MediaStorageError::InvalidFileName);
    }

    Ok(())
}

#[must_use]
pub fn is_valid_file_name(name: &str) -> bool {
    validate_file_name(name).is_ok()
}
