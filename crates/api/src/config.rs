//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ARVIGO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - HS256 signing secret (min 32 chars, high entropy)
//! - `ML_API_URL` - Base URL of the product recommendation service
//!
//! ## Optional
//! - `ARVIGO_HOST` - Bind address (default: 127.0.0.1)
//! - `ARVIGO_PORT` - Listen port (default: 8080)
//! - `JWT_EXPIRY_HOURS` - Bearer token lifetime (default: 168)
//! - `ML_API_TIMEOUT_SECS` - Recommendation service request timeout (default: 10)
//! - `UPLOAD_DIR` - Directory product images are written to (default: uploads)
//! - `PUBLIC_ASSET_URL` - URL prefix uploaded images are served under (default: /uploads)
//! - `MAX_UPLOAD_MB` - Request body limit of the product upload routes (default: 20)
//! - `ML_API_KEY` - Key the recommendation service sends for the product export (unset: disabled)
//! - `CATALOG_TABLES_PATH` - JSON file overriding the built-in catalog lookup tables
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as copied from a sample `.env` (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// Recommendation service client settings
    pub recommender: RecommenderConfig,
    /// Product image storage
    pub uploads: UploadConfig,
    /// Key expected in `x-api-key` by the product export
    pub ml_api_key: Option<SecretString>,
    /// Optional JSON file with catalog lookup tables
    pub catalog_tables_path: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Bearer token signing configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: SecretString,
    /// Token lifetime
    pub expiry: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Recommendation service configuration.
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Base URL; `/product_search` is resolved against it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Where uploaded product images go and how they are addressed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory files are written to
    pub dir: PathBuf,
    /// Prefix joined with the generated file name to form the stored URL
    pub public_url: String,
    /// Request body limit of the multipart product routes
    pub max_body_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ARVIGO_DATABASE_URL")?;
        let host = parse_env("ARVIGO_HOST", "127.0.0.1")?;
        let port = parse_env("ARVIGO_PORT", "8080")?;

        let jwt_secret = get_required_secret("JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "JWT_SECRET")?;
        let expiry_hours: u64 = parse_env("JWT_EXPIRY_HOURS", "168")?;
        let expiry = hours_to_duration("JWT_EXPIRY_HOURS", expiry_hours)?;

        let ml_url = get_required_env("ML_API_URL")?;
        let base_url = Url::parse(&ml_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ML_API_URL".to_string(), e.to_string()))?;
        let timeout_secs: u64 = parse_env("ML_API_TIMEOUT_SECS", "10")?;

        let max_upload_mb: usize = parse_env("MAX_UPLOAD_MB", "20")?;
        let uploads = UploadConfig {
            dir: PathBuf::from(get_env_or_default("UPLOAD_DIR", "uploads")),
            public_url: get_env_or_default("PUBLIC_ASSET_URL", "/uploads"),
            max_body_bytes: megabytes_to_bytes("MAX_UPLOAD_MB", max_upload_mb)?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt: JwtConfig {
                secret: jwt_secret,
                expiry,
            },
            recommender: RecommenderConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            uploads,
            ml_api_key: get_optional_env("ML_API_KEY").map(SecretString::from),
            catalog_tables_path: get_optional_env("CATALOG_TABLES_PATH").map(PathBuf::from),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    get_required_env(key).map(SecretString::from)
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn hours_to_duration(key: &str, hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("{hours} hours is too large"))
        })
}

fn megabytes_to_bytes(key: &str, megabytes: usize) -> Result<usize, ConfigError> {
    megabytes.checked_mul(1024 * 1024).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("{megabytes} MB is too large"))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secret length is far below f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder or low-entropy signing secrets.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
