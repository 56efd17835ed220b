//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! development error exposure), and creates the axum router ready for serving.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::error::reveal_internal_errors;
use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static segments win over `{id}`, so search and top never parse as ids.
    let api = Router::new()
        .route(
            "/series",
            get(handlers::list_series).post(handlers::create_series),
        )
        .route("/series/search", get(handlers::search_series))
        .route("/series/top", get(handlers::top_series))
        .route(
            "/series/{id}",
            get(handlers::get_series)
                .put(handlers::update_series)
                .delete(handlers::delete_series),
        )
        .route("/series/{id}/comics", get(handlers::list_series_comics))
        .route("/series/{id}/views", post(handlers::increment_series_views))
        .route(
            "/comics",
            get(handlers::list_comics).post(handlers::create_comic),
        )
        .route(
            "/comics/{id}",
            get(handlers::get_comic)
                .put(handlers::update_comic)
                .delete(handlers::delete_comic),
        )
        .method_not_allowed_fallback(handlers::method_not_allowed);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reveal_internal_errors,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::new(repo, Environment::Production);
        let _router = create_router(state);
    }
}
