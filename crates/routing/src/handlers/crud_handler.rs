//! The CRUD interface served by the router.

use async_trait::async_trait;
use helios_interface::{FhirResult, PatchFormat, QueryParams, Resource, TenantId, UserIdentity};

/// The fixed set of FHIR interactions the HTTP layer dispatches to.
///
/// Every operation is scoped to exactly one tenant. Errors raised by the
/// collaborators behind an implementation are returned unchanged.
#[async_trait]
pub trait CrudHandler: Send + Sync {
    /// Validates and stores a new resource, returning what was stored.
    async fn create(
        &self,
        resource_type: &str,
        resource: Resource,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Validates and replaces the current version of a resource.
    async fn update(
        &self,
        resource_type: &str,
        id: &str,
        resource: Resource,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Applies a JSON Patch or JSON Merge Patch document.
    ///
    /// The patched result is not validated.
    async fn patch(
        &self,
        resource_type: &str,
        id: &str,
        patch: PatchFormat,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Reads the current version of a resource.
    async fn read(&self, resource_type: &str, id: &str, tenant_id: &TenantId)
    -> FhirResult<Resource>;

    /// Reads a specific version of a resource.
    async fn vread(
        &self,
        resource_type: &str,
        id: &str,
        vid: &str,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Deletes a resource, returning an OperationOutcome.
    async fn delete(
        &self,
        resource_type: &str,
        id: &str,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Searches one resource type, returning a `searchset` Bundle.
    async fn type_search(
        &self,
        resource_type: &str,
        query_params: &QueryParams,
        allowed_resource_types: &[String],
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Returns the history of every resource of a type as a `history` Bundle.
    async fn type_history(
        &self,
        resource_type: &str,
        query_params: &QueryParams,
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;

    /// Returns the history of one resource as a `history` Bundle.
    async fn instance_history(
        &self,
        resource_type: &str,
        id: &str,
        query_params: &QueryParams,
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource>;
}
