//! Search over the in-memory store.

use async_trait::async_trait;
use helios_interface::core::{Search, SearchResponse, TypeSearchRequest};
use helios_interface::error::SearchError;
use helios_interface::{FhirResult, SearchEntry};
use tracing::{debug, warn};

use crate::matching::{Paging, matches_filters, matches_params, paginate, tenant_base};
use crate::store::MemoryStore;

/// Type-level search over a [`MemoryStore`].
///
/// Scans the live resources of one type; there is no index.
#[derive(Debug, Clone)]
pub struct MemorySearch {
    store: MemoryStore,
}

impl MemorySearch {
    /// Creates a search collaborator reading from `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Search for MemorySearch {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn type_search(&self, request: TypeSearchRequest) -> FhirResult<SearchResponse> {
        let TypeSearchRequest {
            resource_type,
            query_params,
            base_url,
            allowed_resource_types,
            search_filters,
            tenant_id,
        } = request;

        debug!(
            backend = "memory",
            resource_type = %resource_type,
            tenant = %tenant_id,
            params = query_params.len(),
            filters = search_filters.len(),
            "Searching resources"
        );

        if !allowed_resource_types.iter().any(|t| t == &resource_type) {
            warn!(resource_type = %resource_type, "Search on a resource type that is not allowed");
            return Err(SearchError::ResourceTypeNotAllowed { resource_type }.into());
        }

        let paging = Paging::from_params(&query_params, self.store.config())?;
        let base = tenant_base(&base_url, &tenant_id);

        let mut entries = Vec::new();
        for version in self.store.current_versions(&tenant_id, &resource_type) {
            if !matches_params(&version.content, &query_params)?
                || !matches_filters(&version.content, &search_filters)
            {
                continue;
            }
            let full_url = format!("{}/{}/{}", base, resource_type, version.id);
            entries.push(SearchEntry::matched(full_url, version.to_resource()?));
        }

        let link_base = format!("{}/{}", base, resource_type);
        Ok(paginate(entries, paging, &link_base, &query_params).into())
    }
}
