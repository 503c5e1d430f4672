//! FHIR route configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::routing::interactions;
use crate::state::AppState;

/// Builds the FHIR routes, served both at the root (tenant from header or
/// configuration) and under `/tenant/{tenant_id}`.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(interactions::health_handler))
        .merge(interaction_routes())
        .nest("/tenant/{tenant_id}", interaction_routes())
        .with_state(state)
}

fn interaction_routes() -> Router<AppState> {
    Router::new()
        // Type-level routes
        .route(
            "/{resource_type}",
            get(interactions::search_get_handler).post(interactions::create_handler),
        )
        .route(
            "/{resource_type}/_search",
            post(interactions::search_post_handler),
        )
        .route(
            "/{resource_type}/_history",
            get(interactions::history_type_handler),
        )
        // Instance-level routes
        .route(
            "/{resource_type}/{id}",
            get(interactions::read_handler)
                .put(interactions::update_handler)
                .patch(interactions::patch_handler)
                .delete(interactions::delete_handler),
        )
        .route(
            "/{resource_type}/{id}/_history",
            get(interactions::history_instance_handler),
        )
        .route(
            "/{resource_type}/{id}/_history/{version_id}",
            get(interactions::vread_handler),
        )
}
