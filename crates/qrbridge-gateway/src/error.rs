use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrbridge_admin::AdminError;
use qrbridge_core::{CoreError, ObjectStoreError};
use qrbridge_qr::QrError;
use qrbridge_redirector::RedirectorError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Redirect(#[from] RedirectorError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        Self::Admin(AdminError::Validation(value))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    /// Set only when a group lost its mappings but not its row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_mappings: Option<u64>,
}

fn object_store_status(err: &ObjectStoreError) -> (StatusCode, &'static str) {
    match err {
        ObjectStoreError::InvalidObject(_) => (StatusCode::BAD_REQUEST, "invalid_upload"),
        ObjectStoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "upload_failed"),
        ObjectStoreError::Operation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "upload_failed"),
    }
}

impl AppError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Redirect(err) => match err {
                RedirectorError::RandomLinkRequired => {
                    (StatusCode::BAD_REQUEST, "random_link_required")
                }
                RedirectorError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                RedirectorError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },
            AppError::Admin(err) => match err {
                AdminError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                AdminError::UnknownGroup(_) => (StatusCode::BAD_REQUEST, "unknown_group"),
                AdminError::MappingNotFound(_) | AdminError::GroupNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found")
                }
                AdminError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                AdminError::LinksExhausted(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "links_exhausted")
                }
                AdminError::Upload(err) => object_store_status(err),
                AdminError::PartialGroupDeletion { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "partial_group_deletion")
                }
                AdminError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },
            AppError::Qr(err) => match err {
                QrError::Payload(_) => (StatusCode::UNPROCESSABLE_ENTITY, "qr_payload_too_long"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "qr_export_failed"),
            },
            AppError::ObjectStore(err) => object_store_status(err),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_multipart"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error, message = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error, message = %self, "request rejected");
        }

        let removed_mappings = match &self {
            AppError::Admin(AdminError::PartialGroupDeletion {
                removed_mappings, ..
            }) => Some(*removed_mappings),
            _ => None,
        };

        let body = ErrorResponse {
            error,
            message: self.to_string(),
            removed_mappings,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrbridge_core::StorageError;

    #[test]
    fn status_codes() {
        let cases = [
            (
                AppError::from(RedirectorError::RandomLinkRequired),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(RedirectorError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(RedirectorError::Storage(StorageError::Timeout("t".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(CoreError::InvalidUrl("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(AdminError::Conflict("ab12xy".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(ObjectStoreError::InvalidObject("empty".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status().0, expected, "{err}");
        }
    }

    #[test]
    fn partial_deletion_carries_the_removed_count() {
        let err = AppError::from(AdminError::PartialGroupDeletion {
            group: "Marketing".to_string(),
            removed_mappings: 3,
            source: StorageError::Unavailable("down".to_string()),
        });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
