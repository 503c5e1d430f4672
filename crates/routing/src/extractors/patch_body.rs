//! Patch body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use helios_interface::PatchFormat;
use serde_json::Value;

use super::fhir_resource::{content_type, media_type};
use crate::error::RestError;

/// A PATCH request body, classified by its Content-Type.
///
/// | Content-Type | Format |
/// |--------------|--------|
/// | `application/json-patch+json` | JSON Patch |
/// | `application/merge-patch+json`, `application/json`, `application/fhir+json` | JSON Merge Patch |
#[derive(Debug)]
pub struct PatchBody(pub PatchFormat);

impl PatchBody {
    /// Consumes the extractor and returns the patch.
    pub fn into_inner(self) -> PatchFormat {
        self.0
    }
}

impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req);
        let json_patch = match media_type(&content_type).as_str() {
            "application/json-patch+json" => true,
            "application/merge-patch+json" | "application/json" | "application/fhir+json" => false,
            _ => return Err(RestError::UnsupportedMediaType { content_type }),
        };

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: e.body_text(),
            })?;
        let document: Value = serde_json::from_slice(&bytes)?;

        Ok(PatchBody(if json_patch {
            PatchFormat::JsonPatch(document)
        } else {
            PatchFormat::MergePatch(document)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_patch() {
        let req = request(
            "application/json-patch+json",
            r#"[{"op":"replace","path":"/active","value":false}]"#,
        );
        let PatchBody(patch) = PatchBody::from_request(req, &()).await.unwrap();
        assert!(matches!(patch, PatchFormat::JsonPatch(_)));
    }

    #[tokio::test]
    async fn test_merge_patch() {
        for ct in ["application/merge-patch+json", "application/json"] {
            let req = request(ct, r#"{"active":false}"#);
            let PatchBody(patch) = PatchBody::from_request(req, &()).await.unwrap();
            assert!(matches!(patch, PatchFormat::MergePatch(_)), "{ct}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let req = request("text/plain", "active=false");
        let err = PatchBody::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, RestError::UnsupportedMediaType { .. }));
    }
}
