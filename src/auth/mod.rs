//! JWT authentication gate.
//!
//! Dual-token system: short-lived access tokens (5 min, stateless) and
//! long-lived refresh tokens (2 weeks, database-tracked). Expired access
//! tokens are renewed by middleware from the `Refresh-Token` header, and the
//! new access token is returned in the response's `Authorization` header.

mod errors;
mod extractors;
mod headers;
mod middleware;
mod paths;
mod session;
mod state;

pub use errors::{AuthError, AuthErrorKind};
pub use extractors::CurrentUser;
pub use headers::{REFRESH_TOKEN_HEADER, access_token, refresh_token};
pub use middleware::require_auth;
pub use paths::{DEFAULT_PUBLIC_PATHS, PublicPaths};
pub use session::{AuthResult, SessionAuthenticator};
pub use state::HasAuthBackend;
