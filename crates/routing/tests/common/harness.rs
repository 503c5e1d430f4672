//! HTTP test harness over the in-memory collaborators.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestRequest, TestResponse, TestServer};
use helios_memory::{AllowAllAuthorization, MemoryConfig, MemorySearch, MemoryStore};
use helios_routing::{ResourceHandler, ServerConfig, create_app};
use serde_json::Value;

pub const X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// A running test server plus direct access to its store.
pub struct RoutingTestHarness {
    pub server: TestServer,
    pub store: MemoryStore,
    pub config: ServerConfig,
}

impl RoutingTestHarness {
    /// Creates a harness with the default test configuration.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Creates a harness with a custom configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        let store = MemoryStore::with_config(MemoryConfig::new(
            config.default_page_size,
            config.max_page_size,
        ));

        let mut authorization = AllowAllAuthorization::new();
        if let Some(token) = &config.access_token {
            authorization = authorization.with_required_token(token.clone());
        }
        let authorization = Arc::new(authorization);

        let handler = ResourceHandler::new(
            Arc::new(store.clone()),
            Arc::new(MemorySearch::new(store.clone())),
            Arc::new(store.clone()),
            authorization.clone(),
            config.fhir_version,
            config.base_url.clone(),
        );

        let app = create_app(Arc::new(handler), authorization, config.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            store,
            config,
        }
    }

    /// Makes a GET request for `tenant`.
    pub async fn get(&self, tenant: &str, path: &str) -> TestResponse {
        with_tenant(self.server.get(path), tenant).await
    }

    /// Makes a POST request with a FHIR JSON body for `tenant`.
    pub async fn post(&self, tenant: &str, path: &str, body: &Value) -> TestResponse {
        with_tenant(fhir_json(self.server.post(path), body), tenant).await
    }

    /// Makes a PUT request with a FHIR JSON body for `tenant`.
    pub async fn put(&self, tenant: &str, path: &str, body: &Value) -> TestResponse {
        with_tenant(fhir_json(self.server.put(path), body), tenant).await
    }

    /// Makes a PATCH request with the given content type.
    pub async fn patch(
        &self,
        tenant: &str,
        path: &str,
        content_type: &str,
        body: &Value,
    ) -> TestResponse {
        let request = self
            .server
            .patch(path)
            .bytes(body.to_string().into())
            .content_type(content_type);
        with_tenant(request, tenant).await
    }

    /// Makes a DELETE request for `tenant`.
    pub async fn delete(&self, tenant: &str, path: &str) -> TestResponse {
        with_tenant(self.server.delete(path), tenant).await
    }

    /// Creates a resource and returns the stored body.
    pub async fn seed(&self, tenant: &str, resource_type: &str, body: &Value) -> Value {
        let response = self.post(tenant, &format!("/{resource_type}"), body).await;
        assert_eq!(response.status_code(), 201, "seed failed: {}", response.text());
        response.json()
    }
}

/// Test configuration serving a fixed base URL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        base_url: "http://fhir.test".to_string(),
        default_tenant: "default-tenant".to_string(),
        ..ServerConfig::for_testing()
    }
}

fn with_tenant(request: TestRequest, tenant: &str) -> TestRequest {
    request.add_header(
        X_TENANT_ID,
        HeaderValue::from_str(tenant).expect("tenant is a header value"),
    )
}

fn fhir_json(request: TestRequest, body: &Value) -> TestRequest {
    request
        .bytes(body.to_string().into())
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/fhir+json"))
}
