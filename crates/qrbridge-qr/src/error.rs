use thiserror::Error;

pub type Result<T> = std::result::Result<T, QrError>;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("payload cannot be encoded as a QR code: {0}")]
    Payload(#[from] qrcode::types::QrError),

    #[error("invalid render options: {0}")]
    InvalidOptions(String),

    #[error("logo is not a readable image: {0}")]
    Logo(#[source] image::ImageError),

    #[error("failed to encode {format}: {reason}")]
    Encode {
        format: &'static str,
        reason: String,
    },
}
