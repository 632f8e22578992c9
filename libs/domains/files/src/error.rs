use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Shown for every upload that is not an acceptable image
pub const NOT_AN_IMAGE: &str = "Make sure that the file is an image";

#[derive(Debug, Error)]
pub enum FileError {
    #[error("No file field in the upload")]
    MissingFile,

    #[error("File '{0}' does not have an allowed extension")]
    InvalidExtension(String),

    #[error(transparent)]
    Rejection(#[from] MultipartRejection),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::MissingFile | FileError::InvalidExtension(_) => {
                AppError::InvalidUpload(NOT_AN_IMAGE.to_string())
            }
            FileError::Rejection(e) => AppError::MultipartRejection(e),
            FileError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::PayloadTooLarge(e.body_text())
            }
            FileError::Multipart(e) => AppError::InvalidUpload(e.body_text()),
        }
    }
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        if let FileError::InvalidExtension(name) = &self {
            tracing::info!(file_name = %name, "Rejected upload");
        }
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
