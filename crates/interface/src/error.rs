//! Error types shared by the resource handler and its collaborators.
//!
//! Collaborators (persistence, search, history, authorization) raise these
//! errors and the handler propagates them untouched. The only error the
//! handler raises itself is [`ValidationError`], before a create or update
//! reaches persistence.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

use crate::tenant::TenantId;

/// The primary error type for every collaborator and handler operation.
#[derive(Error, Debug)]
pub enum FhirError {
    /// Resource state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Concurrency and versioning errors
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authorization errors
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Tenant errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Search and history query errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FhirError {
    /// Returns `true` if this error reports a missing resource or version.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FhirError::Resource(ResourceError::NotFound { .. })
                | FhirError::Resource(ResourceError::VersionNotFound { .. })
        )
    }

    /// Returns `true` if this is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, FhirError::Validation(_))
    }
}

/// Errors related to resource state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested resource was not found.
    #[error("resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    /// The requested version of the resource was not found.
    #[error("version not found: {resource_type}/{id}/_history/{version_id}")]
    VersionNotFound {
        resource_type: String,
        id: String,
        version_id: String,
    },

    /// A resource with the given ID already exists.
    #[error("resource already exists: {resource_type}/{id}")]
    AlreadyExists { resource_type: String, id: String },

    /// The resource has been deleted (HTTP 410 Gone).
    #[error("resource deleted: {resource_type}/{id}")]
    Gone {
        resource_type: String,
        id: String,
        deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    },
}

/// Errors related to concurrency control.
#[derive(Error, Debug)]
pub enum ConcurrencyError {
    /// The version supplied with an update is not the current version.
    #[error("version conflict: expected {expected_version}, found {actual_version}")]
    VersionConflict {
        resource_type: String,
        id: String,
        expected_version: String,
        actual_version: String,
    },
}

/// Errors related to resource validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The resource failed validation.
    #[error("invalid resource: {message}")]
    InvalidResource {
        message: String,
        details: Vec<ValidationDetail>,
    },

    /// The resource type is not supported.
    #[error("unsupported resource type: {resource_type}")]
    UnsupportedResourceType { resource_type: String },

    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// The patch document could not be applied.
    #[error("invalid patch: {message}")]
    InvalidPatch { message: String },
}

/// Detailed validation error information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// The path to the offending element, e.g. `Patient.name[0].family`.
    pub path: String,
    /// A human-readable error message.
    pub message: String,
    /// The severity of the issue.
    pub severity: ValidationSeverity,
}

impl ValidationDetail {
    /// Creates an error-severity detail.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Severity level for validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Fatal error - operation cannot proceed.
    Error,
    /// Warning - operation can proceed but with concerns.
    Warning,
    /// Informational - no action required.
    Information,
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationSeverity::Error => write!(f, "error"),
            ValidationSeverity::Warning => write!(f, "warning"),
            ValidationSeverity::Information => write!(f, "information"),
        }
    }
}

/// Errors raised by the authorization collaborator.
#[derive(Error, Debug)]
pub enum AuthorizationError {
    /// The caller could not be identified.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller is known but may not perform the operation.
    #[error("forbidden: {operation} on {resource_type} is not permitted")]
    Forbidden {
        operation: String,
        resource_type: String,
    },
}

/// Errors related to tenant identification.
#[derive(Error, Debug)]
pub enum TenantError {
    /// The tenant identifier is malformed or unknown.
    #[error("invalid tenant: {tenant_id}")]
    InvalidTenant { tenant_id: TenantId },
}

/// Errors related to search and history queries.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A query parameter has an unusable value.
    #[error("invalid search parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// The caller may not search the requested resource type.
    #[error("resource type '{resource_type}' is not allowed for this search")]
    ResourceTypeNotAllowed { resource_type: String },
}

/// Errors originating from a collaborator's backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for handler and collaborator operations.
pub type FhirResult<T> = Result<T, FhirError>;

impl From<serde_json::Error> for FhirError {
    fn from(err: serde_json::Error) -> Self {
        FhirError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}
