//! HTTP server and routes.

pub mod handlers;
pub(crate) mod page;
mod state;

pub use state::{AppState, CoverUpload};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/books", get(handlers::api_books))
        .route("/admin/book", post(handlers::admin_create_book))
        .route("/book/{id}/comment", post(handlers::add_comment))
        .route("/book/{id}/comments", get(handlers::list_comments))
        .route("/stats", get(handlers::api_stats));

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .nest("/api", api_routes)
        .nest_service("/assets", ServeDir::new(state.assets_dir()))
        .nest_service("/uploads", ServeDir::new(state.uploads_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
