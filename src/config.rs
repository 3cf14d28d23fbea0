use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::logging::{LogConfig, LogFormat};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub log: LogConfig,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                message: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        let token_ttl_days = parse_or(&lookup, "TOKEN_TTL_DAYS", DEFAULT_TOKEN_TTL_DAYS)?;
        if token_ttl_days < 1 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_DAYS",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            token_ttl_days,
            bcrypt_cost,
            log: LogConfig {
                level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
