//! Query string extractor with `validator` checks.

use crate::errors::AppError;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query counterpart of [`ValidatedJson`](super::ValidatedJson).
///
/// Values that do not deserialize (e.g. `limit=-1` into a `u64`) are
/// rejected with `INVALID_QUERY`; values that break a rule with
/// `VALIDATION_ERROR`.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state).await?;
        params.validate()?;
        Ok(ValidatedQuery(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Page {
        #[validate(range(min = 1))]
        limit: Option<u64>,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            get(|ValidatedQuery(page): ValidatedQuery<Page>| async move {
                page.limit.unwrap_or(10).to_string()
            }),
        )
    }

    async fn status_for(uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_accepts_missing_and_valid_values() {
        assert_eq!(status_for("/").await, StatusCode::OK);
        assert_eq!(status_for("/?limit=5").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_rule_violation_and_bad_type() {
        assert_eq!(status_for("/?limit=0").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/?limit=-3").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/?limit=ten").await, StatusCode::BAD_REQUEST);
    }
}
