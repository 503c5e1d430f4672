//! # helios-routing - FHIR CRUD routing
//!
//! This crate turns FHIR RESTful interactions into calls on injected
//! collaborators. It contains no storage, search or authorization logic of
//! its own.
//!
//! ## Components
//!
//! - [`handlers::ResourceHandler`] - implements [`handlers::CrudHandler`] by
//!   validating input and delegating to the persistence, search, history and
//!   authorization collaborators defined in `helios-interface`
//! - [`validation::Validator`] - structural validation against a FHIR version
//! - [`bundle::BundleGenerator`] - `searchset` and `history` Bundles
//! - [`responses::OperationsGenerator`] - OperationOutcome resources
//! - [`create_app`] - the Axum application exposing the handler over HTTP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use helios_memory::{AllowAllAuthorization, MemorySearch, MemoryStore};
//! use helios_routing::{ResourceHandler, ServerConfig, create_app};
//!
//! let config = ServerConfig::default();
//! let store = MemoryStore::new();
//! let authorization = Arc::new(AllowAllAuthorization::new());
//! let handler = ResourceHandler::new(
//!     Arc::new(store.clone()),
//!     Arc::new(MemorySearch::new(store.clone())),
//!     Arc::new(store),
//!     authorization.clone(),
//!     config.fhir_version,
//!     config.base_url.clone(),
//! );
//! let app = create_app(Arc::new(handler), authorization, config);
//! ```
//!
//! ## Error Handling
//!
//! Errors are returned as FHIR OperationOutcome resources; see [`error`] for
//! the status code mapping.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bundle;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod state;
pub mod validation;

pub use bundle::{BundleGenerator, BundleType};
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use handlers::{CrudHandler, ResourceHandler};
pub use responses::OperationsGenerator;
pub use state::AppState;
pub use validation::Validator;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode};
use helios_interface::Authorization;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application.
///
/// `authorization` verifies the bearer token of every request; it is
/// usually the same collaborator the handler derives search filters from.
pub fn create_app(
    handler: Arc<dyn CrudHandler>,
    authorization: Arc<dyn Authorization>,
    config: ServerConfig,
) -> Router {
    info!(
        authorization = authorization.backend_name(),
        fhir_version = %config.fhir_version,
        "Creating FHIR routing application"
    );

    let state = AppState::new(handler, authorization, config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "helios_routing={level},helios_memory={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
