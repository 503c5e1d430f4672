//! Authorization collaborator contract.

use async_trait::async_trait;

use crate::error::FhirResult;
use crate::types::{SearchFilter, TypeOperation, UserIdentity};

/// Request for the filters a caller is subject to.
#[derive(Debug, Clone)]
pub struct SearchFilterRequest {
    /// The caller, as returned by [`Authorization::verify_access_token`].
    pub user_identity: UserIdentity,
    /// The interaction being performed.
    pub operation: TypeOperation,
    /// The resource type being read.
    pub resource_type: String,
    /// The instance id, for instance-level interactions.
    pub id: Option<String>,
}

/// Request to identify a caller from an access token.
#[derive(Debug, Clone)]
pub struct VerifyAccessTokenRequest {
    /// The bearer token, if the caller sent one.
    pub access_token: Option<String>,
    /// The interaction being performed.
    pub operation: TypeOperation,
    /// The resource type addressed.
    pub resource_type: Option<String>,
    /// The instance id addressed.
    pub id: Option<String>,
    /// The version id addressed.
    pub vid: Option<String>,
}

/// Caller identification and access filtering.
#[async_trait]
pub trait Authorization: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Derives the search filters that restrict what `user_identity` may see.
    ///
    /// An empty list means no restriction.
    ///
    /// # Errors
    ///
    /// * `FhirError::Authorization(Forbidden)` - If the caller may not perform
    ///   the operation at all
    async fn get_search_filter_based_on_identity(
        &self,
        request: SearchFilterRequest,
    ) -> FhirResult<Vec<SearchFilter>>;

    /// Identifies the caller of an interaction.
    ///
    /// # Errors
    ///
    /// * `FhirError::Authorization(Unauthorized)` - If the token is missing or invalid
    /// * `FhirError::Authorization(Forbidden)` - If the caller may not perform
    ///   the interaction
    async fn verify_access_token(
        &self,
        request: VerifyAccessTokenRequest,
    ) -> FhirResult<UserIdentity>;
}
