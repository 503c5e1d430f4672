//! Response header generation.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use helios_interface::Resource;

/// FHIR JSON media type.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Builder for resource response headers.
///
/// Generates the ETag, Last-Modified, Location and Content-Type headers
/// that accompany a single resource.
#[derive(Debug)]
pub struct ResourceHeaders {
    etag: Option<String>,
    last_modified: Option<String>,
    location: Option<String>,
    content_type: String,
}

impl Default for ResourceHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHeaders {
    /// Creates a new ResourceHeaders builder.
    pub fn new() -> Self {
        Self {
            etag: None,
            last_modified: None,
            location: None,
            content_type: FHIR_JSON.to_string(),
        }
    }

    /// Derives ETag and Last-Modified from the resource's `meta`.
    pub fn from_resource(resource: &Resource) -> Self {
        let mut headers = Self::new();
        if let Some(version_id) = resource.version_id() {
            headers = headers.with_version(version_id);
        }
        if let Some(last_updated) = resource
            .last_updated()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        {
            headers = headers.with_last_modified(http_date(last_updated.with_timezone(&Utc)));
        }
        headers
    }

    /// Sets the ETag from a version ID.
    pub fn with_version(mut self, version_id: &str) -> Self {
        self.etag = Some(format!("W/\"{}\"", version_id));
        self
    }

    /// Sets the Last-Modified timestamp.
    pub fn with_last_modified(mut self, timestamp: impl Into<String>) -> Self {
        self.last_modified = Some(timestamp.into());
        self
    }

    /// Sets the Location URL.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Converts to an Axum HeaderMap.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }

        let optional = [
            (header::ETAG, &self.etag),
            (header::LAST_MODIFIED, &self.last_modified),
            (header::LOCATION, &self.location),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }

        headers
    }

    /// Returns the ETag value.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Returns the Last-Modified value.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Returns the Location value.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

fn http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new() {
        let headers = ResourceHeaders::new();
        assert_eq!(headers.content_type, FHIR_JSON);
        assert!(headers.etag().is_none());
    }

    #[test]
    fn test_with_version() {
        let headers = ResourceHeaders::new().with_version("42");
        assert_eq!(headers.etag(), Some("W/\"42\""));
    }

    #[test]
    fn test_from_resource() {
        let resource = Resource::try_from(json!({
            "resourceType": "Patient",
            "id": "p1",
            "meta": {"versionId": "3", "lastUpdated": "2024-01-15T10:30:00.000Z"}
        }))
        .unwrap();

        let headers = ResourceHeaders::from_resource(&resource);
        assert_eq!(headers.etag(), Some("W/\"3\""));
        assert_eq!(headers.last_modified(), Some("Mon, 15 Jan 2024 10:30:00 GMT"));
    }

    #[test]
    fn test_from_resource_without_meta() {
        let resource = Resource::try_from(json!({"resourceType": "Patient"})).unwrap();
        let headers = ResourceHeaders::from_resource(&resource);
        assert!(headers.etag().is_none());
        assert!(headers.last_modified().is_none());
    }

    #[test]
    fn test_to_header_map() {
        let headers = ResourceHeaders::new()
            .with_version("1")
            .with_location("http://example.com/Patient/123");

        let map = headers.to_header_map();

        assert_eq!(map[header::CONTENT_TYPE], FHIR_JSON);
        assert_eq!(map[header::ETAG], "W/\"1\"");
        assert!(map.contains_key(header::LOCATION));
        assert!(!map.contains_key(header::LAST_MODIFIED));
    }
}
