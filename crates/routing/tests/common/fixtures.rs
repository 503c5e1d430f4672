//! Resource fixtures.

use helios_interface::Resource;
use serde_json::{Value, json};

/// A minimal valid Patient body.
pub fn patient_json(family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "active": true,
        "name": [{"family": family, "given": ["Test"]}]
    })
}

/// A minimal valid Patient.
pub fn patient(family: &str) -> Resource {
    Resource::try_from(patient_json(family)).expect("fixture is a resource")
}

/// A Patient as a persistence backend would return it.
pub fn stored_patient(id: &str, version: &str) -> Resource {
    Resource::try_from(json!({
        "resourceType": "Patient",
        "id": id,
        "meta": {"versionId": version, "lastUpdated": "2024-01-15T10:30:00.000Z"},
        "active": true,
        "name": [{"family": "Stored"}]
    }))
    .expect("fixture is a resource")
}

/// A Patient that fails validation: empty array and illegal id.
pub fn invalid_patient() -> Resource {
    Resource::try_from(json!({
        "resourceType": "Patient",
        "id": "not valid!",
        "name": []
    }))
    .expect("fixture is a resource")
}

/// A minimal valid Observation body.
pub fn observation_json(status: &str) -> Value {
    json!({
        "resourceType": "Observation",
        "status": status,
        "code": {"text": "heart rate"}
    })
}
