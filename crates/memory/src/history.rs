//! History for the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helios_interface::core::{History, InstanceHistoryRequest, SearchResponse, TypeHistoryRequest};
use helios_interface::error::{ResourceError, SearchError};
use helios_interface::{FhirResult, QueryParams, SearchEntry, SearchFilter};
use tracing::debug;

use crate::matching::{Paging, matches_filters, paginate, tenant_base};
use crate::store::{MemoryStore, StoredVersion};

/// Reads `_since` as an RFC 3339 instant.
fn parse_since(params: &QueryParams) -> FhirResult<Option<DateTime<Utc>>> {
    let Some(raw) = params.get("_since") else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|e| {
            SearchError::InvalidParameter {
                parameter: "_since".to_string(),
                message: format!("expected an RFC 3339 instant: {}", e),
            }
            .into()
        })
}

impl MemoryStore {
    /// Turns a newest-first version list into one history page.
    fn history_page(
        &self,
        versions: Vec<StoredVersion>,
        params: &QueryParams,
        filters: &[SearchFilter],
        base: &str,
        link_base: &str,
    ) -> FhirResult<SearchResponse> {
        let since = parse_since(params)?;
        let paging = Paging::from_params(params, self.config())?;

        let entries = versions
            .into_iter()
            .filter(|v| since.is_none_or(|since| v.last_updated >= since))
            .filter(|v| matches_filters(&v.content, filters))
            .map(|v| {
                let full_url = format!(
                    "{}/{}/{}/_history/{}",
                    base, v.resource_type, v.id, v.version_id
                );
                Ok(SearchEntry::matched(full_url, v.to_resource()?))
            })
            .collect::<FhirResult<Vec<_>>>()?;

        Ok(paginate(entries, paging, link_base, params).into())
    }
}

#[async_trait]
impl History for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn type_history(&self, request: TypeHistoryRequest) -> FhirResult<SearchResponse> {
        debug!(
            backend = "memory",
            resource_type = %request.resource_type,
            tenant = %request.tenant_id,
            filters = request.search_filters.len(),
            "Reading type history"
        );

        let versions = self
            .history_versions(&request.tenant_id, &request.resource_type, None)
            .unwrap_or_default();
        let base = tenant_base(&request.base_url, &request.tenant_id);
        let link_base = format!("{}/{}/_history", base, request.resource_type);

        self.history_page(
            versions,
            &request.query_params,
            &request.search_filters,
            &base,
            &link_base,
        )
    }

    async fn instance_history(
        &self,
        request: InstanceHistoryRequest,
    ) -> FhirResult<SearchResponse> {
        debug!(
            backend = "memory",
            resource_type = %request.resource_type,
            id = %request.id,
            tenant = %request.tenant_id,
            "Reading instance history"
        );

        let versions = self
            .history_versions(&request.tenant_id, &request.resource_type, Some(&request.id))
            .ok_or_else(|| ResourceError::NotFound {
                resource_type: request.resource_type.clone(),
                id: request.id.clone(),
            })?;
        let base = tenant_base(&request.base_url, &request.tenant_id);
        let link_base = format!("{}/{}/{}/_history", base, request.resource_type, request.id);

        self.history_page(
            versions,
            &request.query_params,
            &request.search_filters,
            &base,
            &link_base,
        )
    }
}
