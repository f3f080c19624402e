use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use qrbridge_core::{Repository, StorageError};
use qrbridge_redirector::RedirectorError;

pub async fn redirect_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(random_link): Path<String>,
) -> Result<Response> {
    let url = state.redirector().redirect(Some(&random_link)).await?;
    let location = HeaderValue::try_from(url).map_err(|e| {
        RedirectorError::Storage(StorageError::InvalidData(format!(
            "destination of {} is not a valid Location header: {}",
            random_link, e
        )))
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// `/api/redirect` with nothing after it.
pub async fn missing_link_handler() -> AppError {
    RedirectorError::RandomLinkRequired.into()
}
