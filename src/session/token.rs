use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::types::{IssuedToken, SessionClaims};
use crate::shared::AppError;

/// Message for any credential that fails a signature or format check
pub const INVALID_CREDENTIAL: &str = "Invalid session token";
pub const EXPIRED_CREDENTIAL: &str = "Session token expired";

/// Signs and verifies session JWTs with the server-held secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    /// Default lifetime of tokens issued at login/signup
    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(
        &self,
        subject_id: &str,
        subject_email: &str,
        validity: Duration,
    ) -> Result<IssuedToken, AppError> {
        self.issue_at(subject_id, subject_email, validity, Utc::now())
    }

    /// Creates a signed token valid from `now` until `now + validity`
    #[instrument(skip(self, subject_email, now))]
    pub fn issue_at(
        &self,
        subject_id: &str,
        subject_email: &str,
        validity: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        if subject_id.is_empty() || subject_email.is_empty() {
            warn!("Refusing to issue token for empty subject");
            return Err(AppError::JwtError(
                "token subject id and email must be non-empty".to_string(),
            ));
        }

        let expires_at = now.checked_add_signed(validity).ok_or_else(|| {
            warn!(validity_secs = validity.num_seconds(), "Token expiry out of range");
            AppError::JwtError("token expiry is out of range".to_string())
        })?;

        let claims = SessionClaims {
            id: subject_id.to_string(),
            email: subject_email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        debug!(
            validity_secs = validity.num_seconds(),
            exp_timestamp = claims.exp,
            "Creating session token"
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                warn!(error = %e, "Failed to encode session token");
                AppError::JwtError(e.to_string())
            },
        )?;

        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks signature and expiry against `now`. A token is still valid at
    /// exactly its expiration second.
    #[instrument(skip(self, token, now))]
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AppError> {
        // Expiry is checked below against the caller's clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode session token");
                AppError::Unauthenticated(INVALID_CREDENTIAL.to_string())
            })?;

        if now.timestamp() > claims.exp {
            debug!(exp = claims.exp, now = now.timestamp(), "Session token expired");
            return Err(AppError::Unauthenticated(EXPIRED_CREDENTIAL.to_string()));
        }

        debug!(user_id = %claims.id, exp = claims.exp, "Session token verified");
        Ok(claims)
    }
}
