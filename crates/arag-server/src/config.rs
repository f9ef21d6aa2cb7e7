//! Server settings

use std::env;
use std::fmt;
use std::time::Duration;

use arag_core::{Error, Result};
use arag_workflow::config::parse_bool;

pub const DEFAULT_PORT: u16 = 50000;

/// Requests allowed per client within one window, e.g. `100/minute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub unit: String,
    pub window: Duration,
}

impl RateLimit {
    /// Parse `<n>/<second|minute|hour|day>`; plural units are accepted
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::Configuration(format!("Invalid rate limit '{}'", value));

        let (count, unit) = value.split_once('/').ok_or_else(invalid)?;
        let requests: u32 = count.trim().parse().map_err(|_| invalid())?;
        if requests == 0 {
            return Err(invalid());
        }

        let unit = unit.trim().to_lowercase();
        let (unit, seconds) = match unit.trim_end_matches('s') {
            "second" => ("second", 1),
            "minute" => ("minute", 60),
            "hour" => ("hour", 3600),
            "day" => ("day", 86400),
            _ => return Err(invalid()),
        };

        Ok(Self {
            requests,
            unit: unit.to_string(),
            window: Duration::from_secs(seconds),
        })
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per 1 {}", self.requests, self.unit)
    }
}

/// HTTP-facing settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub environment: String,
    pub rate_limit_enabled: bool,
    pub rate_limit: RateLimit,
    pub cors_enabled: bool,
    /// `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "production".to_string(),
            rate_limit_enabled: false,
            rate_limit: RateLimit {
                requests: 100,
                unit: "minute".to_string(),
                window: Duration::from_secs(60),
            },
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("API_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| Error::Configuration(format!("Invalid API_PORT '{}'", port)))?,
            None => defaults.port,
        };

        let rate_limit = match get("RATE_LIMIT") {
            Some(limit) => RateLimit::parse(&limit)?,
            None => defaults.rate_limit,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port,
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            rate_limit_enabled: get("RATE_LIMIT_ENABLED").is_some_and(|v| parse_bool(&v)),
            rate_limit,
            cors_enabled: get("CORS_ENABLED").map_or(defaults.cors_enabled, |v| parse_bool(&v)),
            cors_origins,
        })
    }

    /// Whether CORS should allow every origin
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
