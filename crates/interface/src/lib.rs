//! Helios resource router interface
//!
//! This crate defines the contracts between the FHIR resource handler and the
//! collaborators it orchestrates. It has no storage or HTTP dependencies.
//!
//! # Architecture
//!
//! - [`core`] - Collaborator traits and their request/response shapes
//! - [`types`] - The [`Resource`] envelope, query parameters, search results
//!   and filters
//! - [`tenant`] - The [`TenantId`] carried by every operation
//! - [`version`] - Supported FHIR versions and their resource types
//! - [`error`] - The [`FhirError`] taxonomy
//!
//! # Example
//!
//! ```
//! use helios_interface::core::ReadResourceRequest;
//! use helios_interface::{Resource, TenantId};
//! use serde_json::json;
//!
//! let request = ReadResourceRequest {
//!     resource_type: "Patient".to_string(),
//!     id: "123".to_string(),
//!     tenant_id: TenantId::new("tenantA"),
//! };
//! assert_eq!(request.tenant_id.as_str(), "tenantA");
//!
//! let resource = Resource::try_from(json!({"resourceType": "Patient", "id": "123"})).unwrap();
//! assert_eq!(resource.id(), Some("123"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod core;
pub mod error;
pub mod tenant;
pub mod types;
pub mod version;

pub use error::{FhirError, FhirResult};
pub use tenant::TenantId;
pub use types::{
    ComparisonOperator, LogicalOperator, PatchFormat, QueryParams, Resource, SearchEntry,
    SearchFilter, SearchMode, SearchResult, TypeOperation, UserIdentity,
};
pub use version::FhirVersion;

// Re-export core traits
pub use core::{Authorization, History, Persistence, Search};
