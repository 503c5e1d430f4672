//! The resource handler.
//!
//! [`ResourceHandler`] owns no storage, indexing or authorization logic. Each
//! operation is a short pipeline: optionally fetch authorization filters,
//! optionally validate, delegate to exactly one collaborator, and optionally
//! wrap the result in a Bundle or OperationOutcome.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use helios_interface::core::{
    CreateResourceRequest, DeleteResourceRequest, InstanceHistoryRequest, PatchResourceRequest,
    ReadResourceRequest, SearchFilterRequest, TypeHistoryRequest, TypeSearchRequest,
    UpdateResourceRequest, VReadResourceRequest,
};
use helios_interface::{
    Authorization, FhirResult, FhirVersion, History, PatchFormat, Persistence, QueryParams,
    Resource, Search, SearchFilter, TenantId, TypeOperation, UserIdentity,
};
use tracing::{debug, warn};

use crate::bundle::{BundleGenerator, BundleType};
use crate::handlers::CrudHandler;
use crate::responses::OperationsGenerator;
use crate::validation::Validator;

/// Dispatches CRUD interactions to injected collaborators.
pub struct ResourceHandler {
    persistence: Arc<dyn Persistence>,
    search: Arc<dyn Search>,
    history: Arc<dyn History>,
    authorization: Arc<dyn Authorization>,
    validator: Validator,
    server_url: String,
}

impl ResourceHandler {
    /// Creates a handler over the given collaborators.
    ///
    /// `server_url` is the externally visible base URL used for Bundle links
    /// and search/history full URLs.
    pub fn new(
        persistence: Arc<dyn Persistence>,
        search: Arc<dyn Search>,
        history: Arc<dyn History>,
        authorization: Arc<dyn Authorization>,
        fhir_version: FhirVersion,
        server_url: impl Into<String>,
    ) -> Self {
        let server_url: String = server_url.into();
        Self {
            persistence,
            search,
            history,
            authorization,
            validator: Validator::new(fhir_version),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the server base URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Returns the FHIR version resources are validated against.
    pub fn fhir_version(&self) -> FhirVersion {
        self.validator.fhir_version()
    }

    fn validate(&self, resource_type: &str, resource: &Resource) -> FhirResult<()> {
        self.validator
            .validate(resource_type, resource)
            .inspect_err(|e| {
                warn!(
                    resource_type = %resource_type,
                    error = %e,
                    "Rejected invalid resource"
                )
            })?;
        Ok(())
    }

    async fn search_filters(
        &self,
        user_identity: &UserIdentity,
        operation: TypeOperation,
        resource_type: &str,
        id: Option<&str>,
    ) -> FhirResult<Vec<SearchFilter>> {
        let filters = self
            .authorization
            .get_search_filter_based_on_identity(SearchFilterRequest {
                user_identity: user_identity.clone(),
                operation,
                resource_type: resource_type.to_string(),
                id: id.map(str::to_string),
            })
            .await?;

        debug!(
            backend = self.authorization.backend_name(),
            operation = %operation,
            filters = filters.len(),
            "Resolved search filters"
        );

        Ok(filters)
    }
}

impl fmt::Debug for ResourceHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("persistence", &self.persistence.backend_name())
            .field("search", &self.search.backend_name())
            .field("history", &self.history.backend_name())
            .field("authorization", &self.authorization.backend_name())
            .field("fhir_version", &self.fhir_version())
            .field("server_url", &self.server_url)
            .finish()
    }
}

#[async_trait]
impl CrudHandler for ResourceHandler {
    async fn create(
        &self,
        resource_type: &str,
        resource: Resource,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(resource_type = %resource_type, tenant = %tenant_id, "Processing create");

        self.validate(resource_type, &resource)?;

        let response = self
            .persistence
            .create_resource(CreateResourceRequest {
                resource_type: resource_type.to_string(),
                resource,
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(response.resource)
    }

    async fn update(
        &self,
        resource_type: &str,
        id: &str,
        resource: Resource,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(resource_type = %resource_type, id = %id, tenant = %tenant_id, "Processing update");

        self.validate(resource_type, &resource)?;

        let response = self
            .persistence
            .update_resource(UpdateResourceRequest {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                resource,
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(response.resource)
    }

    async fn patch(
        &self,
        resource_type: &str,
        id: &str,
        patch: PatchFormat,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(
            resource_type = %resource_type,
            id = %id,
            tenant = %tenant_id,
            content_type = patch.content_type(),
            "Processing patch"
        );

        let response = self
            .persistence
            .patch_resource(PatchResourceRequest {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                patch,
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(response.resource)
    }

    async fn read(
        &self,
        resource_type: &str,
        id: &str,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(resource_type = %resource_type, id = %id, tenant = %tenant_id, "Processing read");

        let response = self
            .persistence
            .read_resource(ReadResourceRequest {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(response.resource)
    }

    async fn vread(
        &self,
        resource_type: &str,
        id: &str,
        vid: &str,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(
            resource_type = %resource_type,
            id = %id,
            vid = %vid,
            tenant = %tenant_id,
            "Processing vread"
        );

        let response = self
            .persistence
            .vread_resource(VReadResourceRequest {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                vid: vid.to_string(),
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(response.resource)
    }

    async fn delete(
        &self,
        resource_type: &str,
        id: &str,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(resource_type = %resource_type, id = %id, tenant = %tenant_id, "Processing delete");

        self.persistence
            .delete_resource(DeleteResourceRequest {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(OperationsGenerator::successful_delete_outcome())
    }

    async fn type_search(
        &self,
        resource_type: &str,
        query_params: &QueryParams,
        allowed_resource_types: &[String],
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(
            resource_type = %resource_type,
            tenant = %tenant_id,
            params = query_params.len(),
            "Processing type search"
        );

        let search_filters = self
            .search_filters(user_identity, TypeOperation::SearchType, resource_type, None)
            .await?;

        let response = self
            .search
            .type_search(TypeSearchRequest {
                resource_type: resource_type.to_string(),
                query_params: query_params.clone(),
                base_url: self.server_url.clone(),
                allowed_resource_types: allowed_resource_types.to_vec(),
                search_filters,
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(BundleGenerator::generate_bundle(
            &self.server_url,
            tenant_id,
            query_params,
            &response.result,
            BundleType::Searchset,
            resource_type,
            None,
        ))
    }

    async fn type_history(
        &self,
        resource_type: &str,
        query_params: &QueryParams,
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(resource_type = %resource_type, tenant = %tenant_id, "Processing type history");

        let search_filters = self
            .search_filters(user_identity, TypeOperation::HistoryType, resource_type, None)
            .await?;

        let response = self
            .history
            .type_history(TypeHistoryRequest {
                resource_type: resource_type.to_string(),
                query_params: query_params.clone(),
                base_url: self.server_url.clone(),
                search_filters,
                tenant_id: tenant_id.clone(),
            })
            .await?;

        Ok(BundleGenerator::generate_bundle(
            &self.server_url,
            tenant_id,
            query_params,
            &response.result,
            BundleType::History,
            resource_type,
            None,
        ))
    }

    async fn instance_history(
        &self,
        resource_type: &str,
        id: &str,
        query_params: &QueryParams,
        user_identity: &UserIdentity,
        tenant_id: &TenantId,
    ) -> FhirResult<Resource> {
        debug!(
            resource_type = %resource_type,
            id = %id,
            tenant = %tenant_id,
            "Processing instance history"
        );

        let search_filters = self
            .search_filters(
                user_identity,
                TypeOperation::HistoryInstance,
                resource_type,
                Some(id),
            )
            .await?;

        let response = self
            .history
            .instance_history(InstanceHistoryRequest {
                id: id.to_string(),
                resource_type: resource_type.to_string(),
                query_params: query_params.clone(),
                base_url: self.server_url.clone(),
                tenant_id: tenant_id.clone(),
                search_filters,
            })
            .await?;

        Ok(BundleGenerator::generate_bundle(
            &self.server_url,
            tenant_id,
            query_params,
            &response.result,
            BundleType::History,
            resource_type,
            Some(id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_memory::{AllowAllAuthorization, MemorySearch, MemoryStore};
    use serde_json::json;

    fn handler() -> ResourceHandler {
        let store = MemoryStore::new();
        ResourceHandler::new(
            Arc::new(store.clone()),
            Arc::new(MemorySearch::new(store.clone())),
            Arc::new(store),
            Arc::new(AllowAllAuthorization::new()),
            FhirVersion::R4,
            "http://fhir.test/",
        )
    }

    #[test]
    fn test_server_url_is_normalized() {
        assert_eq!(handler().server_url(), "http://fhir.test");
    }

    #[test]
    fn test_debug_names_backends() {
        let debug = format!("{:?}", handler());
        assert!(debug.contains("memory"));
        assert!(debug.contains("allow-all"));
    }

    #[tokio::test]
    async fn test_create_read_delete_over_memory() {
        let handler = handler();
        let tenant = TenantId::new("t1");
        let patient =
            Resource::try_from(json!({"resourceType": "Patient", "active": true})).unwrap();

        let created = handler.create("Patient", patient, &tenant).await.unwrap();
        let id = created.id().unwrap().to_string();

        let read = handler.read("Patient", &id, &tenant).await.unwrap();
        assert_eq!(read, created);

        let outcome = handler.delete("Patient", &id, &tenant).await.unwrap();
        assert_eq!(outcome, OperationsGenerator::successful_delete_outcome());
    }
}
