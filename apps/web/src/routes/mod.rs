pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::generation::handlers as generation;
use crate::pages::handlers as pages;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form flow
        .route("/", get(pages::handle_index))
        .route("/select_theme", post(pages::handle_select_theme))
        .route("/generate_ppt", post(generation::handle_generate_ppt))
        .fallback(not_found)
        .with_state(state)
}
