use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SignedCookieJar};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::token::INVALID_CREDENTIAL;
use crate::shared::AppError;

/// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "auth_token";
pub const MISSING_CREDENTIAL: &str = "Token not received";

/// Builds the session cookie. Signing happens when it is added to a `SignedCookieJar`.
pub fn session_cookie(token: String, expires_at: i64) -> Result<Cookie<'static>, AppError> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at).map_err(|e| {
        warn!(error = %e, "Session expiry out of range");
        AppError::Internal
    })?;

    Ok(Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .expires(expires)
        .build())
}

/// Cookie matching the set-time attributes, for `SignedCookieJar::remove`
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .build()
}

/// Reads the session token from request headers, checking the cookie signature.
///
/// A missing cookie and a cookie whose signature does not verify are both
/// `Unauthenticated`, with different messages.
pub fn read_session_token(headers: &HeaderMap, key: &Key) -> Result<String, AppError> {
    if CookieJar::from_headers(headers)
        .get(AUTH_COOKIE_NAME)
        .is_none()
    {
        debug!("No session cookie on request");
        return Err(AppError::Unauthenticated(MISSING_CREDENTIAL.to_string()));
    }

    match SignedCookieJar::from_headers(headers, key.clone()).get(AUTH_COOKIE_NAME) {
        Some(cookie) => Ok(cookie.value().to_string()),
        None => {
            warn!("Session cookie failed signature check");
            Err(AppError::Unauthenticated(INVALID_CREDENTIAL.to_string()))
        }
    }
}
