//! Tenant identifier type.
//!
//! Every handler operation and every collaborator request carries exactly one
//! [`TenantId`]. Collaborators use it as an isolation boundary; no operation
//! may observe data belonging to another tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TenantError;

/// Maximum length of a tenant identifier accepted by [`TenantId::parse`].
pub const MAX_TENANT_ID_LEN: usize = 64;

/// An opaque tenant identifier.
///
/// Construct with [`TenantId::new`] for trusted values (configuration,
/// tests), or [`TenantId::parse`] for values taken from a request.
///
/// # Examples
///
/// ```
/// use helios_interface::tenant::TenantId;
///
/// let tenant = TenantId::parse("tenant-a").unwrap();
/// assert_eq!(tenant.as_str(), "tenant-a");
/// assert!(TenantId::parse("../etc").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID without validating it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses and validates a tenant ID taken from external input.
    ///
    /// Accepts 1 to 64 ASCII letters, digits, `-` or `_`.
    pub fn parse(id: &str) -> Result<Self, TenantError> {
        if Self::is_valid(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(TenantError::InvalidTenant {
                tenant_id: TenantId::new(id),
            })
        }
    }

    /// Returns `true` if `id` is an acceptable tenant identifier.
    pub fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_TENANT_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantId::parse(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let tenant = TenantId::new("my-tenant");
        assert_eq!(tenant.as_str(), "my-tenant");
        assert_eq!(tenant.to_string(), "my-tenant");
    }

    #[test]
    fn test_parse_accepts_valid_ids() {
        for id in ["a", "tenant_A", "acme-2024", &"x".repeat(MAX_TENANT_ID_LEN)] {
            assert!(TenantId::parse(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_parse_rejects_invalid_ids() {
        for id in ["", "acme/research", "has space", "dot.ted", &"x".repeat(65)] {
            let err = TenantId::parse(id).unwrap_err();
            assert!(matches!(err, TenantError::InvalidTenant { .. }), "{id}");
        }
    }

    #[test]
    fn test_from_str_validates() {
        assert!("tenantA".parse::<TenantId>().is_ok());
        assert!("tenant/A".parse::<TenantId>().is_err());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", TenantId::new("t1")), "TenantId(t1)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let tenant = TenantId::new("acme");
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"acme\"");

        let parsed: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tenant);
    }
}
