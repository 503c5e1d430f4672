//! FHIR resource body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use helios_interface::Resource;
use serde_json::Value;

use crate::error::RestError;

/// A JSON request body holding a resource.
///
/// Accepts `application/fhir+json`, `application/json` and other `+json`
/// media types; a missing Content-Type is treated as JSON. The body must be
/// an object with a string `resourceType`. Schema checks happen later, in
/// the resource handler.
#[derive(Debug)]
pub struct FhirResource(pub Resource);

impl FhirResource {
    /// Consumes the extractor and returns the resource.
    pub fn into_inner(self) -> Resource {
        self.0
    }
}

/// Returns the request's Content-Type, defaulting to JSON.
pub(crate) fn content_type(req: &Request) -> String {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string()
}

/// Returns the media type without parameters, lowercased.
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl<S> FromRequest<S> for FhirResource
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req);
        let media_type = media_type(&content_type);
        if media_type != "application/json" && !media_type.ends_with("+json") {
            return Err(RestError::UnsupportedMediaType { content_type });
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: e.body_text(),
            })?;

        let value: Value = serde_json::from_slice(&bytes)?;
        let resource = Resource::try_from(value)?;

        Ok(FhirResource(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_fhir_json() {
        let req = request(
            "application/fhir+json; charset=utf-8",
            r#"{"resourceType":"Patient","id":"1"}"#,
        );
        let FhirResource(resource) = FhirResource::from_request(req, &()).await.unwrap();
        assert_eq!(
            resource.as_value(),
            &json!({"resourceType": "Patient", "id": "1"})
        );
    }

    #[tokio::test]
    async fn test_rejects_xml() {
        let req = request("application/fhir+xml", "<Patient/>");
        let err = FhirResource::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, RestError::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn test_rejects_missing_resource_type() {
        let req = request("application/json", r#"{"id":"1"}"#);
        let err = FhirResource::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, RestError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let req = request("application/json", "{");
        let err = FhirResource::from_request(req, &()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("Application/JSON; charset=utf-8"), "application/json");
    }
}
