use axum::http::HeaderValue;
use axum_extra::extract::cookie::Key;
use chrono::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SESSION_DAYS: i64 = 7;
const MAX_SESSION_DAYS: i64 = 3650;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const MIN_JWT_SECRET_LEN: usize = 32;
const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable is not defined")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Startup configuration for the auth service.
///
/// Built once in `main` and handed to the constructors that need it. Request
/// handling never reads the process environment.
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    cookie_secret: String,
    pub session_expiration_days: i64,
    pub port: u16,
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub mask_login_failures: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("cookie_secret", &"<redacted>")
            .field("session_expiration_days", &self.session_expiration_days)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("cors_origins", &self.cors_origins)
            .field("mask_login_failures", &self.mask_login_failures)
            .finish()
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_JWT_SECRET_LEN),
            });
        }

        let cookie_secret =
            lookup("COOKIE_SECRET").ok_or(ConfigError::Missing("COOKIE_SECRET"))?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "COOKIE_SECRET",
                reason: format!("must be at least {} bytes", MIN_COOKIE_SECRET_LEN),
            });
        }

        let session_expiration_days = match lookup("SESSION_EXPIRATION_DAYS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if (1..=MAX_SESSION_DAYS).contains(&days) => days,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_EXPIRATION_DAYS",
                        reason: format!(
                            "expected between 1 and {} days, got {:?}",
                            MAX_SESSION_DAYS, raw
                        ),
                    })
                }
            },
            None => DEFAULT_SESSION_DAYS,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let mask_login_failures = match lookup("AUTH_MASK_LOGIN_FAILURES") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "AUTH_MASK_LOGIN_FAILURES",
                reason: format!("expected true or false, got {:?}", raw),
            })?,
            None => false,
        };

        Ok(Self {
            jwt_secret,
            cookie_secret,
            session_expiration_days,
            port,
            database_url,
            cors_origins,
            mask_login_failures,
        })
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn session_validity(&self) -> Duration {
        Duration::days(self.session_expiration_days)
    }

    /// Signing key for the cookie transport layer
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.cookie_secret.as_bytes()).map_err(|e| ConfigError::Invalid {
            name: "COOKIE_SECRET",
            reason: e.to_string(),
        })
    }

    pub fn cors_header_values(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_origins
            .iter()
            .map(|origin| {
                // tower-http refuses a wildcard inside an origin list
                if origin == "*" {
                    return Err(ConfigError::Invalid {
                        name: "CORS_ORIGINS",
                        reason: "wildcard origin cannot be used with credentials".to_string(),
                    });
                }
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    reason: format!("{}: {}", origin, e),
                })
            })
            .collect()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
