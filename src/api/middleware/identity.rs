//! Caller identity extraction.
//!
//! Reads `X-User-Id` and `Authorization: Bearer <token>` and injects a
//! [`UserContext`] into request extensions for downstream handlers.
//! Identity is asserted by the front-end's identity provider; nothing is
//! verified here, the token is only forwarded to the document store.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::storage::UserContext;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Attach the caller's [`UserContext`]. Missing or blank ids map to the
/// demo user.
pub async fn attach_user(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let user = user_from_headers(req.headers());
    tracing::debug!(user_id = %user.user_id, has_token = user.bearer_token.is_some(), "Request identity");
    req.extensions_mut().insert(user);
    next.run(req).await
}

pub(crate) fn user_from_headers(headers: &axum::http::HeaderMap) -> UserContext {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    UserContext::new(user_id, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn missing_headers_is_demo_user() {
        let user = user_from_headers(&HeaderMap::new());
        assert!(user.is_demo());
        assert!(user.bearer_token.is_none());
    }

    #[test]
    fn reads_user_and_token() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        let user = user_from_headers(&headers);
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.bearer_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        let user = user_from_headers(&headers);
        assert!(user.is_demo());
        assert!(user.bearer_token.is_none());
    }
}
