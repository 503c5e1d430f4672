//! Structural validation of resources before create and update.
//!
//! The [`Validator`] checks a resource against the resource type list of a
//! [`FhirVersion`] and against the FHIR JSON representation rules. It does
//! not check profiles, cardinalities or terminology bindings.

use chrono::DateTime;
use helios_interface::error::{ValidationDetail, ValidationError, ValidationSeverity};
use helios_interface::{FhirVersion, Resource};
use serde_json::Value;

/// Maximum length of a logical id.
pub const MAX_ID_LEN: usize = 64;

/// Validates resources against one FHIR version.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    fhir_version: FhirVersion,
}

impl Validator {
    /// Creates a validator for `fhir_version`.
    pub fn new(fhir_version: FhirVersion) -> Self {
        Self { fhir_version }
    }

    /// Returns the FHIR version this validator checks against.
    pub fn fhir_version(&self) -> FhirVersion {
        self.fhir_version
    }

    /// Validates `resource` as an instance of `resource_type`.
    ///
    /// Returns every problem found, not just the first.
    pub fn validate(
        &self,
        resource_type: &str,
        resource: &Resource,
    ) -> Result<(), ValidationError> {
        if !self.fhir_version.is_resource_type(resource_type) {
            return Err(ValidationError::UnsupportedResourceType {
                resource_type: resource_type.to_string(),
            });
        }

        let mut details = Vec::new();

        if resource.resource_type() != resource_type {
            details.push(ValidationDetail::error(
                format!("{resource_type}.resourceType"),
                format!(
                    "resourceType '{}' does not match '{}'",
                    resource.resource_type(),
                    resource_type
                ),
            ));
        }

        check_id(resource_type, resource.get("id"), &mut details);
        check_meta(resource_type, resource.get("meta"), &mut details);
        check_elements(resource_type, resource.as_value(), &mut details);

        if details
            .iter()
            .any(|d| d.severity == ValidationSeverity::Error)
        {
            let message = details
                .iter()
                .map(ValidationDetail::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ValidationError::InvalidResource { message, details });
        }

        Ok(())
    }
}

/// Returns `true` for a legal logical id (`[A-Za-z0-9\-\.]{1,64}`).
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Returns `true` for a legal JSON element name (`_?[A-Za-z][A-Za-z0-9_]*`).
pub fn is_valid_element_name(name: &str) -> bool {
    let name = name.strip_prefix('_').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_id(resource_type: &str, id: Option<&Value>, details: &mut Vec<ValidationDetail>) {
    let path = format!("{resource_type}.id");
    match id {
        None | Some(Value::Null) => {}
        Some(Value::String(id)) if is_valid_id(id) => {}
        Some(Value::String(id)) => details.push(ValidationDetail::error(
            path,
            format!("invalid id '{id}': expected 1-{MAX_ID_LEN} letters, digits, '-' or '.'"),
        )),
        Some(_) => details.push(ValidationDetail::error(path, "id must be a string")),
    }
}

fn check_meta(resource_type: &str, meta: Option<&Value>, details: &mut Vec<ValidationDetail>) {
    let meta = match meta {
        None | Some(Value::Null) => return,
        Some(Value::Object(meta)) => meta,
        Some(_) => {
            details.push(ValidationDetail::error(
                format!("{resource_type}.meta"),
                "meta must be an object",
            ));
            return;
        }
    };

    match meta.get("versionId") {
        None | Some(Value::String(_)) | Some(Value::Null) => {}
        Some(_) => details.push(ValidationDetail::error(
            format!("{resource_type}.meta.versionId"),
            "versionId must be a string",
        )),
    }

    match meta.get("lastUpdated") {
        None | Some(Value::Null) => {}
        Some(Value::String(ts)) if DateTime::parse_from_rfc3339(ts).is_ok() => {}
        Some(_) => details.push(ValidationDetail::error(
            format!("{resource_type}.meta.lastUpdated"),
            "lastUpdated must be an instant with a time zone",
        )),
    }
}

/// Walks the document checking element names and empty values.
fn check_elements(path: &str, value: &Value, details: &mut Vec<ValidationDetail>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let child_path = format!("{path}.{name}");
                if name != "resourceType" && !is_valid_element_name(name) {
                    details.push(ValidationDetail::error(
                        &child_path,
                        format!("'{name}' is not a legal element name"),
                    ));
                }
                match child {
                    Value::Null => details.push(ValidationDetail::error(
                        &child_path,
                        "null is not allowed as an element value",
                    )),
                    Value::Object(obj) if obj.is_empty() => details.push(
                        ValidationDetail::error(&child_path, "objects must not be empty"),
                    ),
                    Value::Array(items) if items.is_empty() => details.push(
                        ValidationDetail::error(&child_path, "arrays must not be empty"),
                    ),
                    _ => check_elements(&child_path, child, details),
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                match item {
                    // Primitive arrays align with their `_element` extensions via null.
                    Value::Null => {}
                    Value::Object(obj) if obj.is_empty() => details.push(
                        ValidationDetail::error(&item_path, "objects must not be empty"),
                    ),
                    _ => check_elements(&item_path, item, details),
                }
            }
        }
        _ => {}
    }
}
