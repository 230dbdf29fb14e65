//! Conduit server: HTTP surface over the routing engine
//!
//! Exposes message processing, process orchestration, the Stripe webhook,
//! and administrative configuration endpoints. Configuration persists in
//! PostgreSQL; the engine itself is storage-agnostic.

pub mod admin;
pub mod config;
pub mod db;
pub mod handlers;

use axum::routing::{delete, get, post};
use axum::Router;
use handlers::AppState;
use tower_http::cors::{Any, CorsLayer};

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/messages/process/:thread_id", post(handlers::process_message))
        .route("/orchestrate/:process_name", post(handlers::orchestrate))
        .route("/webhooks/stripe", post(handlers::stripe_webhook))
        .route("/systems", post(admin::create_system).get(admin::list_systems))
        .route("/systems/:id", delete(admin::delete_system))
        .route("/routes", post(admin::create_route).get(admin::list_routes))
        .route("/routes/:id", delete(admin::delete_route))
        .route(
            "/thread-groups",
            post(admin::create_thread_group).get(admin::list_thread_groups),
        )
        .route("/thread-groups/:id", delete(admin::delete_thread_group))
        .route("/threads", post(admin::create_thread).get(admin::list_threads))
        .route("/threads/:id", delete(admin::delete_thread))
        .route("/thread-routes", post(admin::create_thread_route))
        .route("/connections", post(admin::create_connection))
        .route("/connection-auths", post(admin::create_connection_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api)
        .layer(cors)
        .with_state(state)
}
