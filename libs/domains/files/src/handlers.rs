use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use axum_helpers::errors::responses::{BadRequestUploadResponse, InternalServerErrorResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::FileError;
use crate::filter::{FileFilter, UploadConfig};

const TAG: &str = "files";

/// Multipart field that carries the upload
pub const FILE_FIELD: &str = "file";

/// Response to an accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    /// Original name of the uploaded file
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Upload form, for documentation only
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(upload_product_image),
    components(
        schemas(UploadedFile, UploadForm),
        responses(BadRequestUploadResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "File upload endpoints")
    )
)]
pub struct ApiDoc;

/// Create the upload router; mount it under `/files`
pub fn router(config: UploadConfig) -> Router {
    let filter = Arc::new(FileFilter::new(&config.allowed_extensions));

    Router::new()
        .route("/product", post(upload_product_image))
        .layer(DefaultBodyLimit::max(config.max_bytes))
        .with_state(filter)
}

/// Accept a product image and echo its original name
#[utoipa::path(
    post,
    path = "/product",
    tag = TAG,
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image accepted", body = UploadedFile),
        (status = 400, response = BadRequestUploadResponse),
        (status = 413, description = "File exceeds the upload size limit")
    )
)]
async fn upload_product_image(
    State(filter): State<Arc<FileFilter>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedFile>, FileError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or(FileError::MissingFile)?;
        filter.check(&file_name)?;

        // Storage is out of scope; drain the body so size limits apply
        let size = field.bytes().await?.len();
        tracing::info!(file_name = %file_name, size, "Accepted product image");

        return Ok(Json(UploadedFile { file_name }));
    }

    Err(FileError::MissingFile)
}
