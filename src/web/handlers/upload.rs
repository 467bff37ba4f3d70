//! Upload handlers for the Web API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::upload::{StoredFile, DEFAULT_MIME_TYPE};
use crate::web::dto::{ApiResponse, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::StowageError;

/// POST /api/uploads - Upload one or more files.
///
/// Request body: multipart/form-data; every field named after the configured
/// field name (default "media") is a file. Other fields are ignored.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let mut stored: Vec<StoredFile> = Vec::new();

    if let Err(e) = receive_files(&state, &mut multipart, &mut stored).await {
        discard(&state, &stored).await;
        return Err(e);
    }

    if stored.is_empty() {
        return Err(ApiError::bad_request("No file provided"));
    }

    tracing::info!(
        count = stored.len(),
        bytes = stored.iter().map(|f| f.size).sum::<u64>(),
        "Stored uploads"
    );

    let response = UploadResponse {
        files: stored.into_iter().map(Into::into).collect(),
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// Stream every file field to storage, recording what was written.
async fn receive_files(
    state: &AppState,
    multipart: &mut Multipart,
    stored: &mut Vec<StoredFile>,
) -> Result<(), ApiError> {
    let policy = state.storage.policy();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(state.field_name.as_str()) {
            continue;
        }

        if stored.len() >= policy.max_files() {
            return Err(StowageError::TooManyFiles {
                max: policy.max_files(),
            }
            .into());
        }

        let declared_mime = field.content_type().map(str::to_string);
        let original_name = field.file_name().map(str::to_string);

        let mime = declared_mime.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
        if !policy.accept_file(mime) {
            return Err(StowageError::UnsupportedType(mime.to_string()).into());
        }

        let mut pending = state
            .storage
            .begin(original_name.as_deref(), declared_mime.as_deref())
            .await?;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    pending.abort().await;
                    return Err(multipart_error(e));
                }
            };

            let written = pending.write_chunk(&chunk).await;
            if let Err(e) = written {
                tracing::warn!(
                    filename = pending.filename(),
                    error = %e,
                    "Discarding upload"
                );
                pending.abort().await;
                return Err(e.into());
            }
        }

        stored.push(pending.finish().await?);
    }

    Ok(())
}

/// Remove files already written for a request that was rejected.
async fn discard(state: &AppState, stored: &[StoredFile]) {
    for file in stored {
        if let Err(e) = state.storage.delete(&file.filename).await {
            tracing::warn!(filename = %file.filename, error = %e, "Failed to remove upload");
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        tracing::warn!("Failed to read multipart field: {}", err);
        ApiError::bad_request("Invalid multipart data")
    }
}
