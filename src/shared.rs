use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::Key;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::{AuthConfig, ConfigError};
use crate::session::{CredentialHasher, SessionService, TokenIssuer};
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub cookie_key: Key,
}

impl AppState {
    /// Wires the session stack from a startup configuration
    pub fn new(
        config: &AuthConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        let cookie_key = config.cookie_key()?;
        let issuer = TokenIssuer::new(config.jwt_secret(), config.session_validity());
        let session_service =
            SessionService::new(user_repository, issuer, CredentialHasher::default())
                .with_masked_login_failures(config.mask_login_failures);

        Ok(Self::from_parts(Arc::new(session_service), cookie_key))
    }

    /// Assembles state from already-built components
    pub fn from_parts(session_service: Arc<SessionService>, cookie_key: Key) -> Self {
        Self {
            session_service,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Password hashing error: {0}")]
    HashingError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthenticated(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::JwtError(_)
            | AppError::HashingError(_)
            | AppError::DatabaseError(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the kinds that collapse into a generic 500
    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Unauthorized(msg) => msg,
            internal => {
                // Raw causes stay in the logs
                error!(error = %internal, "Request failed with internal error");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
