//! Permissive authorization collaborator.

use async_trait::async_trait;
use helios_interface::core::{Authorization, SearchFilterRequest, VerifyAccessTokenRequest};
use helios_interface::error::AuthorizationError;
use helios_interface::{FhirResult, SearchFilter, UserIdentity};
use tracing::{debug, warn};

/// Grants every interaction and never narrows search results.
///
/// When built with [`with_required_token`](Self::with_required_token), callers
/// must present that bearer token; otherwise any caller, including one
/// without a token, is accepted.
#[derive(Debug, Clone, Default)]
pub struct AllowAllAuthorization {
    required_token: Option<String>,
}

impl AllowAllAuthorization {
    /// Creates an authorization collaborator that accepts every caller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires callers to present `token` as their bearer token.
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }
}

#[async_trait]
impl Authorization for AllowAllAuthorization {
    fn backend_name(&self) -> &'static str {
        "allow-all"
    }

    async fn get_search_filter_based_on_identity(
        &self,
        request: SearchFilterRequest,
    ) -> FhirResult<Vec<SearchFilter>> {
        debug!(
            operation = %request.operation,
            resource_type = %request.resource_type,
            "No search filters for identity"
        );
        Ok(Vec::new())
    }

    async fn verify_access_token(
        &self,
        request: VerifyAccessTokenRequest,
    ) -> FhirResult<UserIdentity> {
        match (&self.required_token, request.access_token.as_deref()) {
            (Some(required), Some(presented)) if required == presented => {
                Ok(UserIdentity::new()
                    .with_claim("sub", "token-holder")
                    .with_claim("authenticated", true))
            }
            (Some(_), presented) => {
                warn!(
                    operation = %request.operation,
                    token_present = presented.is_some(),
                    "Rejected access token"
                );
                Err(AuthorizationError::Unauthorized {
                    message: if presented.is_some() {
                        "invalid access token".to_string()
                    } else {
                        "missing access token".to_string()
                    },
                }
                .into())
            }
            (None, presented) => Ok(UserIdentity::new()
                .with_claim("sub", "anonymous")
                .with_claim("authenticated", presented.is_some())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_interface::{FhirError, TypeOperation};
    use serde_json::json;

    fn verify(token: Option<&str>) -> VerifyAccessTokenRequest {
        VerifyAccessTokenRequest {
            access_token: token.map(String::from),
            operation: TypeOperation::Read,
            resource_type: Some("Patient".to_string()),
            id: Some("123".to_string()),
            vid: None,
        }
    }

    #[tokio::test]
    async fn test_no_filters() {
        let auth = AllowAllAuthorization::new();
        let filters = auth
            .get_search_filter_based_on_identity(SearchFilterRequest {
                user_identity: UserIdentity::new(),
                operation: TypeOperation::SearchType,
                resource_type: "Patient".to_string(),
                id: None,
            })
            .await
            .unwrap();
        assert!(filters.is_empty());
    }

    #[tokio::test]
    async fn test_open_mode_accepts_anyone() {
        let auth = AllowAllAuthorization::new();
        let identity = auth.verify_access_token(verify(None)).await.unwrap();
        assert_eq!(identity.get("sub"), Some(&json!("anonymous")));
        assert_eq!(identity.get("authenticated"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_required_token() {
        let auth = AllowAllAuthorization::new().with_required_token("s3cret");

        let identity = auth.verify_access_token(verify(Some("s3cret"))).await.unwrap();
        assert_eq!(identity.get("authenticated"), Some(&json!(true)));

        for token in [None, Some("wrong")] {
            let err = auth.verify_access_token(verify(token)).await.unwrap_err();
            assert!(matches!(
                err,
                FhirError::Authorization(AuthorizationError::Unauthorized { .. })
            ));
        }
    }
}
