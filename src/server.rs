//! HTTP server and routes.

mod handlers;
mod state;
mod views;

pub use state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let book_routes = Router::new()
        .route("/", post(handlers::submit_book))
        .route("/new", get(handlers::new_book_form))
        .route("/{id}", get(handlers::book_detail))
        .route("/{id}/cover", get(handlers::book_cover));

    let api_routes = Router::new()
        .route(
            "/books",
            get(handlers::api_books).post(handlers::api_add_book),
        )
        .route("/books/{id}", get(handlers::api_book))
        .route("/months", get(handlers::api_months))
        .route("/placeholder", get(handlers::api_placeholder));

    let upload_limit = state.config.server.max_upload_bytes();

    Router::new()
        .route("/", get(handlers::gallery))
        .nest("/books", book_routes)
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
