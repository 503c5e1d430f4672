//! History collaborator contract.

use async_trait::async_trait;

use crate::core::search::SearchResponse;
use crate::error::FhirResult;
use crate::tenant::TenantId;
use crate::types::{QueryParams, SearchFilter};

/// Request for the history of every resource of a type.
#[derive(Debug, Clone)]
pub struct TypeHistoryRequest {
    /// The resource type.
    pub resource_type: String,
    /// History parameters (`_since`, `_count`, ...).
    pub query_params: QueryParams,
    /// The server base URL.
    pub base_url: String,
    /// Authorization-derived filters, applied to every version.
    pub search_filters: Vec<SearchFilter>,
    /// The tenant whose history is read.
    pub tenant_id: TenantId,
}

/// Request for the history of a single resource.
#[derive(Debug, Clone)]
pub struct InstanceHistoryRequest {
    /// The logical id.
    pub id: String,
    /// The resource type.
    pub resource_type: String,
    /// History parameters (`_since`, `_count`, ...).
    pub query_params: QueryParams,
    /// The server base URL.
    pub base_url: String,
    /// The tenant whose history is read.
    pub tenant_id: TenantId,
    /// Authorization-derived filters, applied to every version.
    pub search_filters: Vec<SearchFilter>,
}

/// Change history of stored resources.
///
/// Entries are ordered newest first and include deleted versions.
#[async_trait]
pub trait History: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Returns the history of every resource of a type.
    ///
    /// # Errors
    ///
    /// * `FhirError::Search(InvalidParameter)` - If a parameter value is unusable
    async fn type_history(&self, request: TypeHistoryRequest) -> FhirResult<SearchResponse>;

    /// Returns the history of one resource.
    ///
    /// # Errors
    ///
    /// * `FhirError::Resource(NotFound)` - If the resource never existed
    /// * `FhirError::Search(InvalidParameter)` - If a parameter value is unusable
    async fn instance_history(&self, request: InstanceHistoryRequest)
    -> FhirResult<SearchResponse>;
}
