mod error;
mod handlers;
mod middleware;

pub use error::ApiError;
pub use handlers::{CursorResponse, HealthResponse, SuccessResponse};
pub use middleware::{SecurityConfig, API_KEY_HEADER};

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::models::{Draft, Entity, Idea, Learning, Note, Task};
use crate::store::Store;

/// Create the router with authentication disabled and permissive CORS.
pub fn create_router(store: Store) -> Router {
    create_router_with_config(store, SecurityConfig::disabled())
}

pub fn create_router_with_config(store: Store, security: SecurityConfig) -> Router {
    let learnings = format!("/{}", Learning::COLLECTION);
    let api = Router::new()
        .merge(collection_routes::<Task>())
        .merge(collection_routes::<Idea>())
        .merge(collection_routes::<Draft>())
        .merge(collection_routes::<Note>())
        // Learnings: create and body-addressed update also handle the cursor
        .route(
            &learnings,
            get(handlers::list::<Learning>)
                .post(handlers::create_learning)
                .put(handlers::update_learning)
                .delete(handlers::delete::<Learning>),
        )
        .route(
            &format!("{}/{{id}}", learnings),
            put(handlers::update_by_path::<Learning>)
                .delete(handlers::delete_by_path::<Learning>),
        );

    let api = if security.api_key.is_some() {
        api.layer(from_fn_with_state(
            security.clone(),
            middleware::auth_middleware,
        ))
    } else {
        api
    };

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security.cors_layer()),
        )
        .with_state(store)
}

/// List/create/update/delete routes for one collection, in both the
/// body/query-addressed and the path-addressed forms.
fn collection_routes<E: Entity>() -> Router<Store> {
    let base = format!("/{}", E::COLLECTION);
    Router::new()
        .route(
            &base,
            get(handlers::list::<E>)
                .post(handlers::create::<E>)
                .put(handlers::update::<E>)
                .delete(handlers::delete::<E>),
        )
        .route(
            &format!("{}/{{id}}", base),
            put(handlers::update_by_path::<E>).delete(handlers::delete_by_path::<E>),
        )
}
