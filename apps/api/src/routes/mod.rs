pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tailoring::handlers;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/tailor-resume", post(handlers::handle_tailor_resume))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
