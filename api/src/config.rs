use std::{fmt, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Filesystem,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Filesystem => "fs",
        }
    }
}

/// Admin password, either already hashed with bcrypt or in plain text to be
/// hashed at startup.
#[derive(Clone)]
pub enum AdminSecret {
    Hash(String),
    Plain(String),
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminSecret::Hash(_) => f.write_str("AdminSecret::Hash(..)"),
            AdminSecret::Plain(_) => f.write_str("AdminSecret::Plain(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_secret: AdminSecret,
    /// Origin used when building image URLs, without a trailing slash.
    pub public_base_url: String,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub posters_per_page: usize,
    pub list_cache_ttl: Duration,
    pub rebuild_on_startup: bool,
    pub login_attempts_per_minute: u32,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let admin_secret = match (var("ADMIN_PASSWORD_HASH"), var("ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminSecret::Hash(hash),
            (None, Some(plain)) => AdminSecret::Plain(plain),
            (None, None) => return Err(ConfigError::Missing("ADMIN_PASSWORD_HASH or ADMIN_PASSWORD")),
        };

        let storage_backend = match var("STORAGE_BACKEND").as_deref() {
            None | Some("fs") | Some("filesystem") => StorageBackend::Filesystem,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    message: format!("expected `fs` or `memory`, got `{other}`"),
                });
            }
        };

        let posters_per_page: usize = parse_or(&var, "POSTERS_PER_PAGE", 5)?;
        if posters_per_page == 0 {
            return Err(ConfigError::Invalid {
                key: "POSTERS_PER_PAGE",
                message: "must be at least 1".into(),
            });
        }

        let cors_origins = var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "PORT", 3000)?,
            jwt_secret,
            admin_secret,
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            storage_backend,
            data_dir: var("DATA_DIR").unwrap_or_else(|| "./data".into()).into(),
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            posters_per_page,
            list_cache_ttl: Duration::from_secs(parse_or(&var, "LIST_CACHE_TTL_SECS", 60)?),
            rebuild_on_startup: parse_or(&var, "REBUILD_ON_STARTUP", true)?,
            login_attempts_per_minute: parse_or(&var, "LOGIN_ATTEMPTS_PER_MINUTE", 10)?,
            request_timeout: Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?),
            max_concurrent_requests: parse_or(&var, "MAX_CONCURRENT_REQUESTS", 256)?,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
