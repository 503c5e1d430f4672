//! Axum extractors for FHIR-specific request data.
//!
//! - [`TenantExtractor`] - resolve the tenant from path, header or configuration
//! - [`BearerToken`] - the `Authorization: Bearer` access token, if any
//! - [`FhirResource`] - a JSON request body as a [`Resource`](helios_interface::Resource)
//! - [`PatchBody`] - a JSON Patch or JSON Merge Patch request body
//! - [`FhirQuery`] - the raw query string as ordered [`QueryParams`](helios_interface::QueryParams)

mod bearer;
mod fhir_resource;
mod patch_body;
mod query;
mod tenant;

pub use bearer::BearerToken;
pub use fhir_resource::FhirResource;
pub use patch_body::PatchBody;
pub use query::FhirQuery;
pub use tenant::{TenantExtractor, X_TENANT_ID};
