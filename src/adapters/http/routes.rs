//! HTTP API Route Definitions

use axum::{routing::get, Router};

use super::handlers::{self, AppState};

/// Create the API router with all routes
pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/listings",
            get(handlers::search_listings).post(handlers::create_listing),
        )
        .route(
            "/listings/:id",
            get(handlers::get_listing)
                .patch(handlers::update_listing)
                .delete(handlers::delete_listing),
        )
        .with_state(app_state);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
}
