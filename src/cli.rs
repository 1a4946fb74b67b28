//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::{DEFAULT_PUBLIC_PATHS, PublicPaths};
use crate::clock::SystemClock;
use crate::db::Database;
use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, REFRESH_TOKEN_DURATION_SECS, TokenLifetimes};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tasklist",
    about = "Multi-user task list with JWT authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tasklist.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, default_value_t = ACCESS_TOKEN_DURATION_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub access_token_ttl: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, default_value_t = REFRESH_TOKEN_DURATION_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_token_ttl: u64,

    /// Path reachable without credentials; `*` matches any run of characters.
    /// Repeat to allow several. Replaces the default signup and login paths
    #[arg(long = "public-path", value_name = "PATTERN", value_parser = validate_public_path)]
    pub public_paths: Vec<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_public_path(s: &str) -> Result<String, String> {
    if !s.starts_with('/') && !s.starts_with('*') {
        return Err(format!("Public path must start with '/' or '*': {}", s));
    }

    if s.chars().any(|c| !c.is_ascii() || c.is_whitespace()) {
        return Err(format!("Public path contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build the allow-list, falling back to the defaults when none were given.
pub fn public_paths(patterns: &[String]) -> PublicPaths {
    if patterns.is_empty() {
        PublicPaths::default()
    } else {
        PublicPaths::new(patterns.iter().cloned())
    }
}

/// Check that refresh tokens outlive access tokens.
/// Returns None and logs an error otherwise.
pub fn token_lifetimes(access_secs: u64, refresh_secs: u64) -> Option<TokenLifetimes> {
    if refresh_secs <= access_secs {
        error!(
            access = access_secs,
            refresh = refresh_secs,
            "Refresh token lifetime must be longer than access token lifetime"
        );
        return None;
    }

    Some(TokenLifetimes {
        access_secs,
        refresh_secs,
    })
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    lifetimes: TokenLifetimes,
    public_paths: PublicPaths,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        lifetimes,
        public_paths,
        clock: Arc::new(SystemClock),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tasklist"]).unwrap();

        assert_eq!(args.port, 8080);
        assert_eq!(args.database, "tasklist.db");
        assert_eq!(args.access_token_ttl, ACCESS_TOKEN_DURATION_SECS);
        assert_eq!(args.refresh_token_ttl, REFRESH_TOKEN_DURATION_SECS);
        assert!(args.public_paths.is_empty());

        let paths = public_paths(&args.public_paths);
        for path in DEFAULT_PUBLIC_PATHS {
            assert!(paths.matches(path));
        }
    }

    #[test]
    fn test_public_path_override() {
        let args = Args::try_parse_from([
            "tasklist",
            "--public-path",
            "/users/*",
            "--public-path",
            "/health",
        ])
        .unwrap();

        let paths = public_paths(&args.public_paths);
        assert!(paths.matches("/users/login"));
        assert!(paths.matches("/health"));
        assert!(!paths.matches("/todos"));
    }

    #[test]
    fn test_invalid_public_path() {
        assert!(Args::try_parse_from(["tasklist", "--public-path", "users"]).is_err());
        assert!(Args::try_parse_from(["tasklist", "--public-path", "/a b"]).is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert!(Args::try_parse_from(["tasklist", "--access-token-ttl", "0"]).is_err());
    }

    #[test]
    fn test_token_lifetimes() {
        assert_eq!(
            token_lifetimes(60, 3600),
            Some(TokenLifetimes {
                access_secs: 60,
                refresh_secs: 3600
            })
        );
        assert_eq!(token_lifetimes(3600, 3600), None);
    }
}
