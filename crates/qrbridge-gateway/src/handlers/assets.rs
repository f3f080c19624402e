use crate::error::{AppError, Result};
use crate::model::UploadResponse;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrbridge_core::{Repository, Upload};
use tracing::info;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reads the `file` part of a multipart body into an [`Upload`].
///
/// Parts other than `file` are skipped. An empty `file` part counts as
/// missing, which is what browsers send when no file was picked.
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<Upload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

pub async fn upload_handler<R: Repository>(
    State(state): State<AppState<R>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let upload = read_file_part(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("a non-empty `file` part is required".to_string()))?;

    let file_name = upload.file_name.clone();
    let url = state.object_store().put(upload).await?;
    info!(file_name = %file_name, url = %url, "stored upload");
    Ok(Json(UploadResponse { url }))
}

pub async fn asset_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(key): Path<String>,
) -> Result<Response> {
    let object = state
        .object_store()
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("asset {key}")))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        object.bytes,
    )
        .into_response())
}
