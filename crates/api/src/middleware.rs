//! Request authentication middleware.
//!
//! Runs the authenticator on every request and stores the outcome as an
//! extension. Anonymous is a valid outcome here; it is the handlers' guards
//! that reject it where authentication is required.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::{errors, AppServices};

pub async fn authenticate(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let bearer = extract_bearer(req.headers());

    let identity = services
        .authenticator
        .authenticate(bearer.as_deref())
        .await
        .map_err(|e| errors::ApiError::from(e).into_response())?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// A missing or malformed header is simply "no credential", not a rejection.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn missing_or_malformed_header_is_no_credential() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers_with("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer(&headers_with("Bearer ")), None);
    }
}
