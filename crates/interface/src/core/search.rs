//! Search collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FhirResult;
use crate::tenant::TenantId;
use crate::types::{QueryParams, SearchFilter, SearchResult};

/// Request to search within a single resource type.
#[derive(Debug, Clone)]
pub struct TypeSearchRequest {
    /// The resource type to search.
    pub resource_type: String,
    /// The query parameters as received.
    pub query_params: QueryParams,
    /// The server base URL, used to build entry and paging URLs.
    pub base_url: String,
    /// Resource types the caller may search.
    pub allowed_resource_types: Vec<String>,
    /// Authorization-derived filters, applied to every match.
    pub search_filters: Vec<SearchFilter>,
    /// The tenant to search in.
    pub tenant_id: TenantId,
}

/// A page of results from the search or history collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The result page.
    pub result: SearchResult,
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        Self { result }
    }
}

/// Type-level search over stored resources.
#[async_trait]
pub trait Search: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Searches resources of one type.
    ///
    /// Only resources of `tenant_id` that satisfy both the query parameters
    /// and every search filter are returned.
    ///
    /// # Errors
    ///
    /// * `FhirError::Search(ResourceTypeNotAllowed)` - If `resource_type` is
    ///   not in `allowed_resource_types`
    /// * `FhirError::Search(InvalidParameter)` - If a parameter value is unusable
    async fn type_search(&self, request: TypeSearchRequest) -> FhirResult<SearchResponse>;
}
