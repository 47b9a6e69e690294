//! Environment configuration for the turfbook server.
//!
//! All knobs come from environment variables read once at startup and passed
//! by value into the components that need them; nothing here is consulted
//! again after boot. The token secret and algorithm are mandatory: without
//! them the token subsystem cannot sign anything, so startup fails.

use anyhow::{anyhow, Context, Result};
use jsonwebtoken::Algorithm;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
pub const DEFAULT_HTTP_PORT: u16 = 7878;
pub const DEFAULT_DB_FOLDER: &str = "dbs";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Symmetric secret used to sign and verify bearer tokens.
    pub secret_key: String,
    /// HMAC signing algorithm, e.g. "HS256".
    pub algorithm: Algorithm,
    /// Lifetime of issued tokens, in minutes.
    pub token_ttl_minutes: i64,
    /// Root folder for the document store collections.
    pub db_root: String,
    /// HTTP listen port.
    pub http_port: u16,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `TURFBOOK_SECRET_KEY` and `TURFBOOK_ALGORITHM` are required; the rest
    /// default to `TURFBOOK_TOKEN_TTL_MINUTES=30`, `TURFBOOK_DB_FOLDER=dbs`
    /// and `TURFBOOK_HTTP_PORT=7878`.
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("TURFBOOK_SECRET_KEY")
            .context("TURFBOOK_SECRET_KEY must be set; refusing to sign tokens without a secret")?;
        let algorithm_name = std::env::var("TURFBOOK_ALGORITHM")
            .context("TURFBOOK_ALGORITHM must be set (e.g. HS256)")?;
        let algorithm = parse_algorithm(&algorithm_name)?;

        let token_ttl_minutes = match std::env::var("TURFBOOK_TOKEN_TTL_MINUTES") {
            Ok(v) => v
                .parse::<i64>()
                .with_context(|| format!("TURFBOOK_TOKEN_TTL_MINUTES is not a number: '{}'", v))?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };
        let db_root = std::env::var("TURFBOOK_DB_FOLDER").unwrap_or_else(|_| DEFAULT_DB_FOLDER.to_string());
        let http_port = match std::env::var("TURFBOOK_HTTP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("TURFBOOK_HTTP_PORT is not a port number: '{}'", v))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        Ok(Self { secret_key, algorithm, token_ttl_minutes, db_root, http_port })
    }
}

/// Parse the configured algorithm name. Only the symmetric HMAC family is
/// supported; the server holds a single shared secret, not a key pair.
pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(anyhow!("unsupported token algorithm '{}' (expected HS256/HS384/HS512)", other)),
    }
}
