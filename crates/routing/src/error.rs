//! Error types for the HTTP layer.
//!
//! Collaborator errors surface as [`FhirError`] and are mapped onto HTTP
//! status codes and FHIR OperationOutcome bodies:
//!
//! | Error | HTTP Status | FHIR Issue Code |
//! |-------|-------------|-----------------|
//! | NotFound / VersionNotFound | 404 | not-found |
//! | Gone | 410 | deleted |
//! | AlreadyExists | 409 | duplicate |
//! | VersionConflict | 409 | conflict |
//! | Validation | 400 | invalid |
//! | UnsupportedResourceType | 400 / 404 | not-supported |
//! | Unauthorized | 401 | login |
//! | Forbidden | 403 | forbidden |
//! | InvalidTenant / search errors | 400 | invalid |
//! | Backend unavailable | 503 | transient |
//! | Backend internal | 500 | exception |

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use helios_interface::FhirError;
use helios_interface::error::{
    AuthorizationError, BackendError, ConcurrencyError, ResourceError, SearchError, TenantError,
    ValidationDetail, ValidationError,
};
use thiserror::Error;

use crate::responses::{Issue, IssueType, OperationsGenerator};

/// Errors returned by HTTP handlers.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RestError {
    /// The resource does not exist.
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    /// The resource has been deleted.
    #[error("Resource deleted: {resource_type}/{id}")]
    Gone { resource_type: String, id: String },

    /// The requested version does not exist.
    #[error("Version not found: {resource_type}/{id}/_history/{version_id}")]
    VersionNotFound {
        resource_type: String,
        id: String,
        version_id: String,
    },

    /// A resource with this id already exists.
    #[error("Resource already exists: {resource_type}/{id}")]
    AlreadyExists { resource_type: String, id: String },

    /// The supplied version is not the current one.
    #[error("Version conflict: {message}")]
    VersionConflict {
        resource_type: String,
        id: String,
        message: String,
    },

    /// The resource failed validation.
    #[error("Invalid resource: {message}")]
    Invalid {
        message: String,
        details: Vec<ValidationDetail>,
    },

    /// The request is malformed.
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The resource type is not served by this server.
    #[error("Resource type not supported: {resource_type}")]
    ResourceTypeNotSupported { resource_type: String },

    /// The request body's content type cannot be handled.
    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    /// Authentication is required or failed.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller may not perform the interaction.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// A collaborator backend is unavailable.
    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    /// Unexpected failure.
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            RestError::NotFound { resource_type, id } => (
                StatusCode::NOT_FOUND,
                IssueType::NotFound,
                format!("Resource {}/{} not found", resource_type, id),
            ),
            RestError::Gone { resource_type, id } => (
                StatusCode::GONE,
                IssueType::Deleted,
                format!("Resource {}/{} has been deleted", resource_type, id),
            ),
            RestError::VersionNotFound {
                resource_type,
                id,
                version_id,
            } => (
                StatusCode::NOT_FOUND,
                IssueType::NotFound,
                format!(
                    "Version {} of {}/{} not found",
                    version_id, resource_type, id
                ),
            ),
            RestError::AlreadyExists { resource_type, id } => (
                StatusCode::CONFLICT,
                IssueType::Duplicate,
                format!("Resource {}/{} already exists", resource_type, id),
            ),
            RestError::VersionConflict { message, .. } => {
                (StatusCode::CONFLICT, IssueType::Conflict, message.clone())
            }
            RestError::Invalid { message, .. } => {
                (StatusCode::BAD_REQUEST, IssueType::Invalid, message.clone())
            }
            RestError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, IssueType::Invalid, message.clone())
            }
            RestError::ResourceTypeNotSupported { resource_type } => (
                StatusCode::NOT_FOUND,
                IssueType::NotSupported,
                format!("Resource type '{}' is not supported", resource_type),
            ),
            RestError::UnsupportedMediaType { content_type } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                IssueType::NotSupported,
                format!("Content type '{}' is not supported", content_type),
            ),
            RestError::Unauthorized { message } => {
                (StatusCode::UNAUTHORIZED, IssueType::Login, message.clone())
            }
            RestError::Forbidden { message } => {
                (StatusCode::FORBIDDEN, IssueType::Forbidden, message.clone())
            }
            RestError::Unavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                IssueType::Transient,
                message.clone(),
            ),
            RestError::InternalError { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                IssueType::Exception,
                message.clone(),
            ),
        };

        let outcome = match &self {
            RestError::Invalid { details, .. } if !details.is_empty() => {
                let issues: Vec<Issue> = details.iter().map(Issue::from).collect();
                OperationsGenerator::generate(&issues)
            }
            _ => OperationsGenerator::error_outcome(code, &details),
        };

        let mut response = (status, Json(outcome)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<FhirError> for RestError {
    fn from(err: FhirError) -> Self {
        match err {
            FhirError::Resource(e) => e.into(),
            FhirError::Concurrency(e) => e.into(),
            FhirError::Validation(e) => e.into(),
            FhirError::Authorization(e) => e.into(),
            FhirError::Tenant(e) => e.into(),
            FhirError::Search(e) => e.into(),
            FhirError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { resource_type, id } => {
                RestError::NotFound { resource_type, id }
            }
            ResourceError::VersionNotFound {
                resource_type,
                id,
                version_id,
            } => RestError::VersionNotFound {
                resource_type,
                id,
                version_id,
            },
            ResourceError::AlreadyExists { resource_type, id } => {
                RestError::AlreadyExists { resource_type, id }
            }
            ResourceError::Gone {
                resource_type, id, ..
            } => RestError::Gone { resource_type, id },
        }
    }
}

impl From<ConcurrencyError> for RestError {
    fn from(err: ConcurrencyError) -> Self {
        match err {
            ConcurrencyError::VersionConflict {
                resource_type,
                id,
                expected_version,
                actual_version,
            } => RestError::VersionConflict {
                message: format!(
                    "Resource {}/{} is at version {}, not {}",
                    resource_type, id, actual_version, expected_version
                ),
                resource_type,
                id,
            },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidResource { message, details } => {
                RestError::Invalid { message, details }
            }
            ValidationError::UnsupportedResourceType { .. }
            | ValidationError::MissingRequiredField { .. }
            | ValidationError::InvalidPatch { .. } => RestError::BadRequest {
                message: err.to_string(),
            },
        }
    }
}

impl From<AuthorizationError> for RestError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthorized { message } => RestError::Unauthorized { message },
            AuthorizationError::Forbidden { .. } => RestError::Forbidden {
                message: err.to_string(),
            },
        }
    }
}

impl From<TenantError> for RestError {
    fn from(err: TenantError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<SearchError> for RestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidParameter { .. } => RestError::BadRequest {
                message: err.to_string(),
            },
            SearchError::ResourceTypeNotAllowed { .. } => RestError::Forbidden {
                message: err.to_string(),
            },
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable { .. } => RestError::Unavailable {
                message: err.to_string(),
            },
            BackendError::Internal { .. } | BackendError::SerializationError { .. } => {
                RestError::InternalError {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type for HTTP handlers.
pub type RestResult<T> = Result<T, RestError>;
