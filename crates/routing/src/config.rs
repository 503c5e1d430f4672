//! Server configuration.
//!
//! Configuration is read from command line arguments with environment
//! variable fallbacks.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HFS_SERVER_PORT` | 8080 | Server port |
//! | `HFS_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `HFS_LOG_LEVEL` | info | Log level |
//! | `HFS_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `HFS_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `HFS_ENABLE_CORS` | true | Enable CORS |
//! | `HFS_CORS_ORIGINS` | * | Allowed origins |
//! | `HFS_CORS_METHODS` | GET,POST,PUT,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `HFS_CORS_HEADERS` | Content-Type,Authorization,Accept,X-Tenant-ID | Allowed headers |
//! | `HFS_DEFAULT_TENANT` | default | Tenant for requests that name none |
//! | `HFS_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `HFS_FHIR_VERSION` | 4.0.1 | FHIR version resources are validated against |
//! | `HFS_RESOURCE_TYPES` | all types of the version | Served resource types (comma-separated) |
//! | `HFS_ACCESS_TOKEN` | unset | Bearer token every request must present |
//! | `HFS_DEFAULT_PAGE_SIZE` | 20 | Default page size |
//! | `HFS_MAX_PAGE_SIZE` | 1000 | Maximum page size |
//!
//! # Example
//!
//! ```rust
//! use helios_routing::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     resource_types: Some("Patient,Observation".to_string()),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.served_resource_types(), ["Patient", "Observation"]);
//! ```

use clap::Parser;
use helios_interface::{FhirVersion, TenantId};

const DEFAULT_CORS_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
const DEFAULT_CORS_HEADERS: &str = "Content-Type,Authorization,Accept,X-Tenant-ID";

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "hfs")]
#[command(about = "Helios FHIR Server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "HFS_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HFS_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HFS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "HFS_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "HFS_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "HFS_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "HFS_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "HFS_CORS_METHODS", default_value = DEFAULT_CORS_METHODS)]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(long, env = "HFS_CORS_HEADERS", default_value = DEFAULT_CORS_HEADERS)]
    pub cors_headers: String,

    /// Tenant used when neither the path nor X-Tenant-ID names one.
    #[arg(long, env = "HFS_DEFAULT_TENANT", default_value = "default")]
    pub default_tenant: String,

    /// Base URL for the server (used in Location headers and Bundle links).
    #[arg(long, env = "HFS_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// FHIR version resources are validated against.
    #[arg(long, env = "HFS_FHIR_VERSION", default_value = "4.0.1")]
    pub fhir_version: FhirVersion,

    /// Served resource types (comma-separated). Defaults to every type of the FHIR version.
    #[arg(long, env = "HFS_RESOURCE_TYPES")]
    pub resource_types: Option<String>,

    /// Bearer token every request must present. Unset accepts anonymous requests.
    #[arg(long, env = "HFS_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Default page size for search and history results.
    #[arg(long, env = "HFS_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for search and history results.
    #[arg(long, env = "HFS_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: DEFAULT_CORS_METHODS.to_string(),
            cors_headers: DEFAULT_CORS_HEADERS.to_string(),
            default_tenant: "default".to_string(),
            base_url: "http://localhost:8080".to_string(),
            fhir_version: FhirVersion::default(),
            resource_types: None,
            access_token: None,
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the resource types this server answers for.
    pub fn served_resource_types(&self) -> Vec<String> {
        match &self.resource_types {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => self
                .fhir_version
                .resource_types()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Validates the configuration and returns every error found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if !TenantId::is_valid(&self.default_tenant) {
            errors.push(format!("Invalid default tenant: '{}'", self.default_tenant));
        }

        if let Err(e) = url::Url::parse(&self.base_url) {
            errors.push(format!("Invalid base URL '{}': {}", self.base_url, e));
        }

        let served = self.served_resource_types();
        if served.is_empty() {
            errors.push("At least one resource type must be served".to_string());
        }
        for resource_type in &served {
            if !self.fhir_version.is_resource_type(resource_type) {
                errors.push(format!(
                    "Unknown resource type for FHIR {}: {}",
                    self.fhir_version, resource_type
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            default_tenant: "test-tenant".to_string(),
            base_url: "http://localhost:0".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.fhir_version, FhirVersion::R4);
        assert!(config.enable_cors);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Port")));
    }

    #[test]
    fn test_validate_invalid_page_sizes() {
        let config = ServerConfig {
            default_page_size: 100,
            max_page_size: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reports_every_error() {
        let config = ServerConfig {
            default_tenant: "not/valid".to_string(),
            base_url: "not a url".to_string(),
            resource_types: Some("Patient,Spaceship".to_string()),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("Spaceship")));
    }

    #[test]
    fn test_served_resource_types() {
        let config = ServerConfig {
            resource_types: Some(" Patient , Observation,,".to_string()),
            ..Default::default()
        };
        assert_eq!(config.served_resource_types(), ["Patient", "Observation"]);

        let all = ServerConfig::default().served_resource_types();
        assert!(all.iter().any(|t| t == "Patient"));
        assert!(all.iter().any(|t| t == "DeviceUseStatement"));
    }

    #[test]
    fn test_parse_from_args() {
        let config = ServerConfig::parse_from([
            "hfs",
            "--port",
            "9090",
            "--fhir-version",
            "R5",
            "--resource-types",
            "Patient",
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.fhir_version, FhirVersion::R5);
        assert_eq!(config.served_resource_types(), ["Patient"]);
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
        assert_eq!(config.default_tenant, "test-tenant");
    }
}
