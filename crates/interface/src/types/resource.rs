//! The resource envelope.
//!
//! A [`Resource`] is a JSON object that is guaranteed to carry a string
//! `resourceType`. Schema conformance is not implied; the validator in the
//! routing crate checks that before create and update.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A FHIR resource in its JSON representation.
///
/// # Examples
///
/// ```
/// use helios_interface::Resource;
/// use serde_json::json;
///
/// let resource = Resource::try_from(json!({
///     "resourceType": "Patient",
///     "id": "123",
///     "meta": {"versionId": "2"}
/// }))
/// .unwrap();
///
/// assert_eq!(resource.resource_type(), "Patient");
/// assert_eq!(resource.id(), Some("123"));
/// assert_eq!(resource.version_id(), Some("2"));
///
/// assert!(Resource::try_from(json!({"id": "123"})).is_err());
/// ```
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resource(Value);

impl Resource {
    /// Builds a resource of `resource_type` from its remaining elements.
    ///
    /// Any `resourceType` already present in `elements` is replaced.
    pub fn from_elements(resource_type: &str, mut elements: Map<String, Value>) -> Self {
        elements.insert(
            "resourceType".to_string(),
            Value::String(resource_type.to_string()),
        );
        Self(Value::Object(elements))
    }

    /// Returns the declared `resourceType`.
    pub fn resource_type(&self) -> &str {
        self.0
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns the logical id, if the resource carries one.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Returns `meta.versionId`, if present.
    pub fn version_id(&self) -> Option<&str> {
        self.meta_str("versionId")
    }

    /// Returns `meta.lastUpdated`, if present.
    pub fn last_updated(&self) -> Option<&str> {
        self.meta_str("lastUpdated")
    }

    /// Returns a top-level element.
    pub fn get(&self, element: &str) -> Option<&Value> {
        self.0.get(element)
    }

    /// Returns the top-level elements of the resource.
    pub fn elements(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.as_object().into_iter().flat_map(Map::iter)
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the envelope, returning the JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    fn meta_str(&self, field: &str) -> Option<&str> {
        self.0.get("meta")?.get(field)?.as_str()
    }
}

impl TryFrom<Value> for Resource {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = &value else {
            return Err(ValidationError::InvalidResource {
                message: "resource must be a JSON object".to_string(),
                details: Vec::new(),
            });
        };

        match map.get("resourceType") {
            Some(Value::String(rt)) if !rt.is_empty() => Ok(Self(value)),
            Some(_) => Err(ValidationError::InvalidResource {
                message: "resourceType must be a non-empty string".to_string(),
                details: Vec::new(),
            }),
            None => Err(ValidationError::MissingRequiredField {
                field: "resourceType".to_string(),
            }),
        }
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.0
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Resource::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resource({}/{})",
            self.resource_type(),
            self.id().unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let resource = Resource::try_from(json!({
            "resourceType": "Observation",
            "id": "obs-1",
            "meta": {"versionId": "3", "lastUpdated": "2024-01-01T00:00:00Z"},
            "status": "final"
        }))
        .unwrap();

        assert_eq!(resource.resource_type(), "Observation");
        assert_eq!(resource.id(), Some("obs-1"));
        assert_eq!(resource.version_id(), Some("3"));
        assert_eq!(resource.last_updated(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(resource.get("status"), Some(&json!("final")));
        assert_eq!(resource.elements().count(), 4);
    }

    #[test]
    fn test_from_elements() {
        let mut elements = Map::new();
        elements.insert("resourceType".to_string(), json!("Wrong"));
        elements.insert("type".to_string(), json!("searchset"));

        let bundle = Resource::from_elements("Bundle", elements);
        assert_eq!(bundle.resource_type(), "Bundle");
        assert_eq!(bundle.get("type"), Some(&json!("searchset")));
    }

    #[test]
    fn test_missing_resource_type() {
        let err = Resource::try_from(json!({"id": "1"})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingRequiredField { ref field } if field == "resourceType"
        ));
    }

    #[test]
    fn test_non_object_rejected() {
        for value in [json!([]), json!("Patient"), json!(null)] {
            let err = Resource::try_from(value).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidResource { .. }));
        }
    }

    #[test]
    fn test_non_string_resource_type_rejected() {
        let err = Resource::try_from(json!({"resourceType": 7})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidResource { .. }));
    }

    #[test]
    fn test_serde_is_transparent() {
        let body = json!({"resourceType": "Patient", "active": true});
        let resource: Resource = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&resource).unwrap(), body);

        assert!(serde_json::from_value::<Resource>(json!({"active": true})).is_err());
    }

    #[test]
    fn test_debug_format() {
        let resource = Resource::try_from(json!({"resourceType": "Patient"})).unwrap();
        assert_eq!(format!("{:?}", resource), "Resource(Patient/-)");
    }
}
