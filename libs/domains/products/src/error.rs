use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::sqlx::postgres::PgDatabaseError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Message shown to clients for any unclassified failure
pub const INTERNAL_MESSAGE: &str = "Unexpected error, check server logs";

#[derive(Debug, Error)]
pub enum ProductError {
    /// Carries the exact term or id the caller asked for
    #[error("Product with id {0} not found")]
    NotFound(String),

    /// Unique key already taken; carries the store's detail text
    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Cause was logged where it was classified
    #[error("{INTERNAL_MESSAGE}")]
    Internal,
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        duplicate_from(err.sql_err(), postgres_detail(&err)).unwrap_or_else(|| {
            tracing::error!(error = ?err, "Unexpected database error");
            ProductError::Internal
        })
    }
}

/// `Duplicate` for a unique violation, preferring the Postgres detail over
/// the driver message. `None` for anything else.
fn duplicate_from(sql_err: Option<SqlErr>, detail: Option<String>) -> Option<ProductError> {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            let detail = detail.unwrap_or(message);
            tracing::info!(detail = %detail, "Unique constraint violated");
            Some(ProductError::Duplicate(detail))
        }
        _ => None,
    }
}

/// `Key (title)=(...) already exists.` from the Postgres error, when present
fn postgres_detail(err: &DbErr) -> Option<String> {
    let source = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e,
        _ => return None,
    };

    source
        .as_database_error()?
        .try_downcast_ref::<PgDatabaseError>()?
        .detail()
        .map(str::to_owned)
}

impl From<validator::ValidationErrors> for ProductError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ProductError::Validation(errors.to_string())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            e @ ProductError::NotFound(_) => AppError::NotFound(e.to_string()),
            ProductError::Duplicate(detail) => AppError::BadRequest(detail),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Internal => AppError::InternalServerError(INTERNAL_MESSAGE.to_string()),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
