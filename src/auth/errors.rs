//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why the authenticator rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No access token on a protected path
    CredentialMissing,
    /// Access token failed signature or structure checks
    MalformedToken,
    /// Access token expired and no refresh token was sent
    RefreshMissing,
    /// Refresh token expired, failed verification, belongs to another user or is not live
    RefreshInvalid,
    /// Store lookup or token signing failed
    Internal,
}

impl AuthErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialMissing => "credential_missing",
            AuthErrorKind::MalformedToken => "malformed_token",
            AuthErrorKind::RefreshMissing => "refresh_missing",
            AuthErrorKind::RefreshInvalid => "refresh_invalid",
            AuthErrorKind::Internal => "internal",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialMissing => "Access token not found",
            AuthErrorKind::MalformedToken => "Invalid access token",
            AuthErrorKind::RefreshMissing => "Access token expired and no refresh token provided",
            AuthErrorKind::RefreshInvalid => "Invalid or expired refresh token",
            AuthErrorKind::Internal => "Internal server error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthErrorKind::CredentialMissing
            | AuthErrorKind::MalformedToken
            | AuthErrorKind::RefreshMissing
            | AuthErrorKind::RefreshInvalid => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthErrorKind {}

/// Rejection returned to the client as JSON.
#[derive(Debug)]
pub struct AuthError(pub AuthErrorKind);

impl From<AuthErrorKind> for AuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self(kind)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
            code: &'static str,
        }

        (
            self.0.status_code(),
            Json(ErrorResponse {
                error: self.0.message(),
                code: self.0.code(),
            }),
        )
            .into_response()
    }
}
