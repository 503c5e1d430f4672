//! Bearer token extractor.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

/// The access token from an `Authorization: Bearer <token>` header.
///
/// Absent or non-bearer credentials yield `None`; deciding whether that is
/// acceptable is left to the authorization collaborator.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    /// Returns the token, if one was presented.
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Consumes the extractor, returning the token.
    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_from_headers(&headers("Bearer abc123")).as_deref(), Some("abc123"));
        assert_eq!(bearer_from_headers(&headers("bearer  xyz ")).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_non_bearer_is_none() {
        assert!(bearer_from_headers(&headers("Basic dXNlcjpwYXNz")).is_none());
        assert!(bearer_from_headers(&headers("Bearer ")).is_none());
        assert!(bearer_from_headers(&HeaderMap::new()).is_none());
    }
}
