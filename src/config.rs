/*
 * Responsibility
 * - Read settings from the environment (PORT, APP_ENV, CORS, admin seed, request limits)
 * - Validate them; anything missing or malformed fails start-up
 *
 * Notes
 * - The token signing key is deliberately not configurable: it is generated at start-up
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::Argon2Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Account created at start-up so there is someone able to call admin-only routes.
#[derive(Clone)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // ADMIN_USERNAME + ADMIN_PASSWORD, both or neither
    pub admin_seed: Option<SeedUser>,

    pub password_hash: Argon2Params,

    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );

        let admin_seed = seed_user(
            std::env::var("ADMIN_USERNAME").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        )?;

        let body_limit_bytes = parse_or(
            "REQUEST_BODY_LIMIT_BYTES",
            std::env::var("REQUEST_BODY_LIMIT_BYTES").ok(),
            DEFAULT_BODY_LIMIT_BYTES,
        )?;
        let timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            std::env::var("REQUEST_TIMEOUT_SECS").ok(),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            admin_seed,
            password_hash: Argon2Params::default(),
            body_limit_bytes,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Positive number from `raw`, or `default` when unset.
fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match raw {
        None => Ok(default),
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

fn seed_user(
    username: Option<String>,
    password: Option<String>,
) -> Result<Option<SeedUser>, ConfigError> {
    let username = username.filter(|s| !s.trim().is_empty());
    let password = password.filter(|s| !s.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(SeedUser { username, password })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::Missing("ADMIN_PASSWORD")),
        (None, Some(_)) => Err(ConfigError::Missing("ADMIN_USERNAME")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn admin_seed_needs_both_halves() {
        let seed = seed_user(Some("root".into()), Some("pw".into())).unwrap().unwrap();
        assert_eq!(seed.username, "root");

        assert!(seed_user(None, None).unwrap().is_none());
        assert!(matches!(
            seed_user(Some("root".into()), None),
            Err(ConfigError::Missing("ADMIN_PASSWORD"))
        ));
        assert!(matches!(
            seed_user(None, Some("pw".into())),
            Err(ConfigError::Missing("ADMIN_USERNAME"))
        ));
    }

    #[test]
    fn request_limits_default_and_reject_garbage() {
        assert_eq!(parse_or("REQUEST_TIMEOUT_SECS", None, 30u64).unwrap(), 30);
        assert_eq!(
            parse_or("REQUEST_TIMEOUT_SECS", Some(" 5 ".into()), 30u64).unwrap(),
            5
        );
        assert!(matches!(
            parse_or("REQUEST_TIMEOUT_SECS", Some("0".into()), 30u64),
            Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))
        ));
        assert!(matches!(
            parse_or("REQUEST_BODY_LIMIT_BYTES", Some("1mb".into()), 1024usize),
            Err(ConfigError::Invalid("REQUEST_BODY_LIMIT_BYTES"))
        ));
    }

    #[test]
    fn seed_debug_hides_password() {
        let seed = SeedUser {
            username: "root".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{seed:?}").contains("hunter2"));
    }
}
