//! Helios FHIR Server (HFS)
//!
//! Serves the FHIR CRUD, search and history interactions over the in-memory
//! collaborators.

use std::sync::Arc;

use clap::Parser;
use helios_interface::core::Authorization;
use helios_memory::{AllowAllAuthorization, MemoryConfig, MemorySearch, MemoryStore};
use helios_routing::{ResourceHandler, ServerConfig, create_app, init_logging};
use tracing::info;

/// Builds the in-memory collaborators and the resource handler.
fn build_handler(config: &ServerConfig) -> (ResourceHandler, Arc<dyn Authorization>) {
    let store = MemoryStore::with_config(MemoryConfig::new(
        config.default_page_size,
        config.max_page_size,
    ));

    let mut authorization = AllowAllAuthorization::new();
    if let Some(token) = &config.access_token {
        info!("Bearer token required for every request");
        authorization = authorization.with_required_token(token.clone());
    }
    let authorization: Arc<dyn Authorization> = Arc::new(authorization);

    let handler = ResourceHandler::new(
        Arc::new(store.clone()),
        Arc::new(MemorySearch::new(store.clone())),
        Arc::new(store),
        authorization.clone(),
        config.fhir_version,
        config.base_url.clone(),
    );
    (handler, authorization)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        fhir_version = %config.fhir_version,
        base_url = %config.base_url,
        default_tenant = %config.default_tenant,
        "Starting Helios FHIR Server"
    );

    let (handler, authorization) = build_handler(&config);
    info!(handler = ?handler, "Resource handler ready");

    let app = create_app(Arc::new(handler), authorization, config.clone());
    serve(app, &config).await
}
