//! Configuration loading and representation.
//!
//! Read once at startup from the process environment and handed to the
//! router builder; nothing else reads environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid { name: &'static str, value: String, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

/// Credentials of the admin employee created on first start.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin").field("email", &self.email).finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cookie_secure: bool,
    pub store: StoreBackend,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("store", &self.store)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// In-memory configuration with the given secret, for tests and demos.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            cookie_secure: false,
            store: StoreBackend::InMemory,
            bootstrap_admin: None,
        }
    }

    pub fn with_bootstrap_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.bootstrap_admin = Some(BootstrapAdmin { email: email.into(), password: password.into() });
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("HR_BIND_ADDR") {
            Some(v) => v.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "HR_BIND_ADDR",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::Missing("HR_BIND_ADDR"))?,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl = match get("TOKEN_TTL_DAYS") {
            Some(v) => match v.trim().parse::<i64>().ok().filter(|days| *days > 0).and_then(Duration::try_days) {
                Some(ttl) => ttl,
                None => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_DAYS",
                        value: v,
                        reason: "expected a positive number of days".into(),
                    });
                }
            },
            None => Duration::days(DEFAULT_TOKEN_TTL_DAYS),
        };

        let cookie_secure = parse_flag("COOKIE_SECURE", get("COOKIE_SECURE"))?;

        let store = if parse_flag("USE_PERSISTENT_STORES", get("USE_PERSISTENT_STORES"))? {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let bootstrap_admin = match (get("HR_ADMIN_EMAIL"), get("HR_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("HR_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("HR_ADMIN_EMAIL")),
        };

        Ok(Self { bind_addr, jwt_secret, token_ttl, cookie_secure, store, bootstrap_admin })
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value, reason: "expected a boolean".into() }),
    }
}
