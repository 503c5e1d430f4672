//! Persistence collaborator contract.
//!
//! This module defines the [`Persistence`] trait, which stores resources
//! keyed by resource type, id and tenant, along with the request and
//! response shapes exchanged with it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FhirResult;
use crate::tenant::TenantId;
use crate::types::{PatchFormat, Resource};

/// Request to store a new resource.
#[derive(Debug, Clone)]
pub struct CreateResourceRequest {
    /// The FHIR resource type (e.g., "Patient").
    pub resource_type: String,
    /// The resource content.
    pub resource: Resource,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// Request to replace the current version of a resource.
#[derive(Debug, Clone)]
pub struct UpdateResourceRequest {
    /// The FHIR resource type.
    pub resource_type: String,
    /// The logical id of the resource being replaced.
    pub id: String,
    /// The new content.
    pub resource: Resource,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// Request to apply a patch to the current version of a resource.
#[derive(Debug, Clone)]
pub struct PatchResourceRequest {
    /// The FHIR resource type.
    pub resource_type: String,
    /// The logical id of the resource being patched.
    pub id: String,
    /// The patch document.
    pub patch: PatchFormat,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// Request to read the current version of a resource.
#[derive(Debug, Clone)]
pub struct ReadResourceRequest {
    /// The FHIR resource type.
    pub resource_type: String,
    /// The logical id.
    pub id: String,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// Request to read a specific version of a resource.
#[derive(Debug, Clone)]
pub struct VReadResourceRequest {
    /// The FHIR resource type.
    pub resource_type: String,
    /// The logical id.
    pub id: String,
    /// The version id.
    pub vid: String,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// Request to delete a resource.
#[derive(Debug, Clone)]
pub struct DeleteResourceRequest {
    /// The FHIR resource type.
    pub resource_type: String,
    /// The logical id.
    pub id: String,
    /// The owning tenant.
    pub tenant_id: TenantId,
}

/// A resource returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// Optional backend message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The stored resource, including any id and metadata the backend assigned.
    pub resource: Resource,
}

impl ResourceResponse {
    /// Wraps a resource without a message.
    pub fn new(resource: Resource) -> Self {
        Self {
            message: None,
            resource,
        }
    }
}

/// Durable storage for FHIR resources.
///
/// Every request carries the tenant it operates on; implementations must
/// never return or modify data belonging to a different tenant.
///
/// # Versioning
///
/// Create, update, patch and delete each produce a new version. The version
/// id is exposed through `meta.versionId` on returned resources and is what
/// [`vread_resource`](Persistence::vread_resource) looks up.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Stores a new resource.
    ///
    /// # Returns
    ///
    /// The stored resource with the id, version and metadata the backend
    /// assigned.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(AlreadyExists)` - If the backend refuses the id
    async fn create_resource(&self, request: CreateResourceRequest)
    -> FhirResult<ResourceResponse>;

    /// Replaces the current version of a resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource doesn't exist
    /// * `FhirError::Concurrency(VersionConflict)` - If the supplied
    ///   `meta.versionId` is not the current version
    async fn update_resource(&self, request: UpdateResourceRequest)
    -> FhirResult<ResourceResponse>;

    /// Applies a patch to the current version of a resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource doesn't exist
    /// * `FhirError::Validation(InvalidPatch)` - If the patch cannot be applied
    async fn patch_resource(&self, request: PatchResourceRequest) -> FhirResult<ResourceResponse>;

    /// Reads the current version of a resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource doesn't exist or
    ///   has been deleted
    async fn read_resource(&self, request: ReadResourceRequest) -> FhirResult<ResourceResponse>;

    /// Reads a specific version of a resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource never existed
    /// * `FhirError::Resource(VersionNotFound)` - If the version doesn't exist
    async fn vread_resource(&self, request: VReadResourceRequest)
    -> FhirResult<ResourceResponse>;

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource doesn't exist
    async fn delete_resource(&self, request: DeleteResourceRequest) -> FhirResult<()>;
}
