//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_prefix_handler, delay_delete_handler, delete_handler,
    exists_handler, get_handler, get_many_handler, health_handler, put_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/cache/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/cache/:key/delay", post(delay_delete_handler))
        .route("/cache/:key/exists", get(exists_handler))
        .route("/mget", post(get_many_handler))
        .route("/clear", delete(clear_all_handler))
        .route("/clear/:prefix", delete(clear_prefix_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
