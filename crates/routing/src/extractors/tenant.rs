//! Tenant extractor.
//!
//! The tenant comes from the `/tenant/{tenant_id}` path prefix when present,
//! otherwise from the `X-Tenant-ID` header, otherwise from the configured
//! default tenant.

use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::{HeaderMap, HeaderName, request::Parts},
};
use helios_interface::TenantId;
use tracing::warn;

use crate::error::RestError;
use crate::state::AppState;

/// Header carrying the tenant when the path does not.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Path parameter naming the tenant in `/tenant/{tenant_id}/...` routes.
const TENANT_PATH_PARAM: &str = "tenant_id";

/// Axum extractor for the request's tenant.
#[derive(Debug, Clone)]
pub struct TenantExtractor {
    tenant_id: TenantId,
}

impl TenantExtractor {
    /// Creates a TenantExtractor for the given tenant.
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    /// Returns the tenant ID.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

impl std::fmt::Display for TenantExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tenant_id)
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&X_TENANT_ID)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Picks the tenant in precedence order and validates it.
fn resolve_tenant(
    from_path: Option<String>,
    from_header: Option<String>,
    default: &str,
) -> Result<TenantId, RestError> {
    let raw = from_path
        .or(from_header)
        .unwrap_or_else(|| default.to_string());
    TenantId::parse(&raw).map_err(|e| {
        warn!(tenant = %raw, "Rejected invalid tenant");
        RestError::from(e)
    })
}

impl FromRequestParts<AppState> for TenantExtractor {
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_path = RawPathParams::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|params| {
                params
                    .iter()
                    .find(|(name, _)| *name == TENANT_PATH_PARAM)
                    .map(|(_, value)| value.to_string())
            });

        let tenant_id = resolve_tenant(
            from_path,
            tenant_from_headers(&parts.headers),
            state.default_tenant(),
        )?;

        Ok(TenantExtractor::new(tenant_id))
    }
}
