pub mod error;
pub mod recipes;
pub mod server;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::frontend::serve_embedded_file;
use crate::state::AppState;

pub use error::ApiError;

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(server::health_check))
        .route("/api/recipes", get(recipes::list_recipes))
        .route("/api/recipes/search", get(recipes::search_recipes))
        // Embedded frontend static files
        .fallback(serve_embedded_file)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
