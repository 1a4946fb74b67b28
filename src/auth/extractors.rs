//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::session::AuthResult;
use super::state::HasAuthBackend;
use crate::api::ApiError;
use crate::db::User;

/// The user the request was authenticated as.
///
/// Resolved from the [`AuthResult`] left by [`super::require_auth`]. For a
/// renewed request the identity comes from the newly issued access token.
/// An unresolvable identity is treated as a missing resource.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .extensions
            .get::<AuthResult>()
            .and_then(|result| result.identity(state.jwt()))
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let user = state
            .db()
            .users()
            .get_by_username(&username)
            .await
            .map_err(|e| ApiError::db_error("Failed to get user", e))?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(CurrentUser(user))
    }
}
