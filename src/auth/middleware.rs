//! Authentication middleware applied in front of every route.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::errors::{AuthError, AuthErrorKind};
use super::session::{AuthResult, SessionAuthenticator};

/// Authenticate the request before it reaches a handler.
///
/// Rejected requests are answered here. Otherwise the [`AuthResult`] is
/// stored in request extensions for extractors, and a renewed access token
/// is written to the response's `Authorization` header.
pub async fn require_auth(
    State(auth): State<SessionAuthenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let result = auth.authenticate(&path, request.headers()).await;

    let renewed = match &result {
        AuthResult::Rejected(kind) => return AuthError(*kind).into_response(),
        AuthResult::Allowed => return next.run(request).await,
        AuthResult::Authenticated(_) => None,
        AuthResult::Renewed(token) => {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => Some(value),
                Err(e) => {
                    error!("Renewed access token is not a valid header value: {}", e);
                    return AuthError(AuthErrorKind::Internal).into_response();
                }
            }
        }
    };

    request.extensions_mut().insert(result);
    let mut response = next.run(request).await;

    if let Some(value) = renewed {
        response.headers_mut().append(header::AUTHORIZATION, value);
    }

    response
}
