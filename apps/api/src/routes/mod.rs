pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::portfolio::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/portfolio",
            get(handlers::handle_get_portfolio).put(handlers::handle_update_portfolio),
        )
        .route("/api/v1/portfolio/slug", put(handlers::handle_publish_slug))
        .route("/api/v1/resume/upload", post(handlers::handle_upload_resume))
        .route("/api/v1/resume/parse", post(handlers::handle_parse_resume))
        .with_state(state)
}
