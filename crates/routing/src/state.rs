//! Shared application state.

use std::sync::Arc;

use helios_interface::Authorization;

use crate::config::ServerConfig;
use crate::handlers::CrudHandler;

/// Shared state available to every HTTP handler.
///
/// # Example
///
/// ```rust,ignore
/// let state = AppState::new(Arc::new(handler), Arc::new(AllowAllAuthorization::new()), config);
/// ```
#[derive(Clone)]
pub struct AppState {
    handler: Arc<dyn CrudHandler>,
    authorization: Arc<dyn Authorization>,
    config: Arc<ServerConfig>,
    resource_types: Arc<Vec<String>>,
}

impl AppState {
    /// Creates the state from a handler, the authorization collaborator that
    /// verifies access tokens, and the server configuration.
    pub fn new(
        handler: Arc<dyn CrudHandler>,
        authorization: Arc<dyn Authorization>,
        config: ServerConfig,
    ) -> Self {
        let resource_types = config.served_resource_types();
        Self {
            handler,
            authorization,
            config: Arc::new(config),
            resource_types: Arc::new(resource_types),
        }
    }

    /// Returns the CRUD handler.
    pub fn handler(&self) -> &dyn CrudHandler {
        self.handler.as_ref()
    }

    /// Returns the authorization collaborator.
    pub fn authorization(&self) -> &dyn Authorization {
        self.authorization.as_ref()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the default tenant ID from configuration.
    pub fn default_tenant(&self) -> &str {
        &self.config.default_tenant
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Returns the served resource types.
    pub fn resource_types(&self) -> &[String] {
        &self.resource_types
    }

    /// Returns `true` if `resource_type` is served.
    pub fn serves(&self, resource_type: &str) -> bool {
        self.resource_types.iter().any(|t| t == resource_type)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("authorization", &self.authorization.backend_name())
            .field("config", &self.config)
            .field("resource_types", &self.resource_types.len())
            .finish_non_exhaustive()
    }
}
