//! Caller identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque description of the caller.
///
/// Produced by the authorization collaborator from an access token and
/// handed back to it when search filters are derived. The resource handler
/// forwards it without looking inside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(BTreeMap<String, Value>);

impl UserIdentity {
    /// Creates an empty identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim, returning the updated identity.
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a claim by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no claims are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all claims.
    pub fn claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Value>> for UserIdentity {
    fn from(claims: BTreeMap<String, Value>) -> Self {
        Self(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims() {
        let identity = UserIdentity::new()
            .with_claim("sub", "user-1")
            .with_claim("roles", json!(["clinician"]));

        assert_eq!(identity.get("sub"), Some(&json!("user-1")));
        assert_eq!(identity.claims().count(), 2);
        assert!(!identity.is_empty());
        assert!(UserIdentity::new().is_empty());
    }

    #[test]
    fn test_serializes_as_map() {
        let identity = UserIdentity::new().with_claim("sub", "u");
        assert_eq!(serde_json::to_value(&identity).unwrap(), json!({"sub": "u"}));
    }
}
