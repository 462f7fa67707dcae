use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::error::Error;
use crate::media::{MediaStorage, MediaStorageError, is_valid_file_name};
use crate::server::AppState;
use crate::server::dto::MediaCreatedResponse;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};

const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

/// Pulls the first field carrying a non-empty filename out of the
/// multipart body. Any further file fields in the same request are
/// ignored; one upload handles one file.
async fn first_file_field(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(ApiError::bad_request(format!(
                "File size ({} bytes) exceeds maximum allowed size ({MAX_UPLOAD_SIZE} bytes)",
                data.len()
            )));
        }

        return Ok(Some((file_name, data)));
    }

    Ok(None)
}

pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();

    let Some((file_name, data)) = first_file_field(&mut multipart).await? else {
        return Err(ApiError::bad_request("No file provided"));
    };

    if !is_valid_file_name(&file_name) {
        return Err(ApiError::bad_request("Invalid file name"));
    }

    // Dedup by filename: a known name short-circuits without a write.
    if let Some(existing) = store
        .get_media_by_file_name(&file_name)
        .api_err("Failed to look up media")?
    {
        return Ok((
            StatusCode::CREATED,
            Json(MediaCreatedResponse {
                result: true,
                media_id: existing.id,
            }),
        ));
    }

    let storage = MediaStorage::new(&state.data_dir);
    storage
        .save(&file_name, &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;

    let file_path = MediaStorage::storage_path(&file_name);
    let media_id = match store.create_media(&file_name, &file_path) {
        Ok(id) => id,
        // Lost a same-name upload race; the winner's row is the dedup
        // target.
        Err(Error::AlreadyExists) => {
            store
                .get_media_by_file_name(&file_name)
                .api_err("Failed to look up media")?
                .or_not_found("Media record vanished after insert conflict")?
                .id
        }
        Err(e) => return Err(ApiError::internal(format!("Failed to create media record: {e}"))),
    };

    Ok((
        StatusCode::CREATED,
        Json(MediaCreatedResponse {
            result: true,
            media_id,
        }),
    ))
}

pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let storage = MediaStorage::new(&state.data_dir);

    let (file, size) = storage.open(&file_name).await.map_err(|e| match e {
        MediaStorageError::NotFound => ApiError::not_found(format!("File {file_name} not found")),
        MediaStorageError::InvalidFileName => ApiError::bad_request("Invalid file name"),
        MediaStorageError::Io(e) => ApiError::internal(format!("Failed to read file: {e}")),
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&file_name)),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&size.to_string()).unwrap(),
    );

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((StatusCode::OK, headers, body).into_response())
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("notes.txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
    }
}
