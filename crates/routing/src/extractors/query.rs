//! Query string extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use helios_interface::QueryParams;

/// The request's query parameters in their original order, repeats kept.
#[derive(Debug, Clone, Default)]
pub struct FhirQuery(pub QueryParams);

impl<S> FromRequestParts<S> for FhirQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = parts
            .uri
            .query()
            .map(QueryParams::parse)
            .unwrap_or_default();
        Ok(FhirQuery(params))
    }
}
