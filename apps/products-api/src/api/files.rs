//! File upload routes

use axum::Router;
use domain_files::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.config.upload.clone())
}
