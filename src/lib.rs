pub mod accounts;
pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod clock;
pub mod db;
pub mod jwt;
pub mod password;

use api::create_api_router;
use auth::{PublicPaths, SessionAuthenticator, require_auth};
use axum::{Router, middleware};
use clock::Clock;
use db::Database;
use jwt::{TokenCodec, TokenLifetimes};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access and refresh token lifetimes
    pub lifetimes: TokenLifetimes,
    /// Paths reachable without credentials
    pub public_paths: PublicPaths,
    /// Time source for token issue and expiry
    pub clock: Arc<dyn Clock>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(
        TokenCodec::new(&config.jwt_secret)
            .with_lifetimes(config.lifetimes)
            .with_clock(config.clock.clone()),
    );

    let authenticator =
        SessionAuthenticator::new(jwt.clone(), config.db.clone(), config.public_paths.clone());

    create_api_router(config.db.clone(), jwt)
        .layer(middleware::from_fn_with_state(authenticator, require_auth))
}

/// Run cleanup tasks and spawn background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database, clock: Arc<dyn Clock>) {
    cleanup::run_cleanup(db, clock.as_ref()).await;
    cleanup::spawn_cleanup_scheduler(db.clone(), clock);
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
