//! # Web Adapter
//!
//! Thin axum layer over the core. Handlers carry no authorization logic of
//! their own: the session middleware resolves the caller, the scopes and
//! the mutation authorizer decide, and [`errors::ApiError`] maps the
//! outcomes onto status codes (Unauthenticated → 401, Forbidden → 403).

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;

pub use errors::ApiError;
pub use state::AppState;

/// Assemble the API router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(handlers::customers::get_customer)
                .patch(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/api/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route("/api/projects/{id}", get(handlers::projects::get_project))
        .route(
            "/api/projects/{id}/status",
            patch(handlers::projects::set_project_status),
        )
        .route(
            "/api/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/api/tasks/{id}", patch(handlers::tasks::patch_task))
        .route(
            "/api/documents/upload",
            post(handlers::documents::upload_document),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    let public = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register));

    protected.merge(public).with_state(state)
}
