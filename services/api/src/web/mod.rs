pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{generate_quote_handler, list_categories_handler};
use state::AppState;

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-quote", post(generate_quote_handler))
        .route("/api/categories", get(list_categories_handler))
        .with_state(app_state)
}
