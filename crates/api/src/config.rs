//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use artisan_auth::{AuthError, DEFAULT_PASSWORD_COST, DEFAULT_TOKEN_TTL_SECS, SigningSecret};
use artisan_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: SigningSecret,
    pub token_ttl_secs: i64,
    pub password_cost: u32,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = SigningSecret::new(lookup("JWT_SECRET").unwrap_or_default())
            .map_err(|_: AuthError| ConfigError::MissingSecret)?;

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), || {
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;

        let token_ttl_secs: i64 = parse_or("TOKEN_TTL_SECS", lookup("TOKEN_TTL_SECS"), || {
            Ok(DEFAULT_TOKEN_TTL_SECS)
        })?;
        if token_ttl_secs <= 0 {
            return Err(invalid("TOKEN_TTL_SECS", token_ttl_secs.to_string(), "must be positive"));
        }

        let password_cost: u32 = parse_or("PASSWORD_COST", lookup("PASSWORD_COST"), || {
            Ok(DEFAULT_PASSWORD_COST)
        })?;
        if !(4..=31).contains(&password_cost) {
            return Err(invalid("PASSWORD_COST", password_cost.to_string(), "must be within 4..=31"));
        }

        let log_format = match non_blank(lookup("LOG_FORMAT")) {
            Some(v) => v.parse::<LogFormat>().map_err(|reason| invalid("LOG_FORMAT", v, &reason))?,
            None => LogFormat::default(),
        };

        let cors_allowed_origins = non_blank(lookup("CORS_ALLOWED_ORIGINS")).map(|v| {
            v.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            password_cost,
            database_url: non_blank(lookup("DATABASE_URL")),
            cors_allowed_origins,
            log_format,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn invalid(name: &'static str, value: String, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value,
        reason: reason.to_string(),
    }
}

fn parse_or<T>(
    name: &'static str,
    value: Option<String>,
    default: impl FnOnce() -> Result<T, String>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_blank(value) {
        Some(v) => v.parse().map_err(|e: T::Err| invalid(name, v.clone(), &e.to_string())),
        None => default().map_err(|reason| invalid(name, String::new(), &reason)),
    }
}
