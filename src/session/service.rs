use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    password::CredentialHasher,
    token::TokenIssuer,
    types::{EstablishedSession, LoginRequest, SessionIdentity, SignupRequest},
};
use crate::{
    shared::AppError,
    user::{repository::UserRepository, UserModel, UserProfile},
};

const USER_EXISTS: &str = "User already exists";
const USER_NOT_FOUND: &str = "User not found";
const INCORRECT_PASSWORD: &str = "Incorrect password";
const INVALID_LOGIN: &str = "Invalid email or password";
const USER_NOT_REGISTERED: &str = "User not registered or token malfunctioned";
const USER_ID_MISMATCH: &str = "User ID mismatch";

/// Session lifecycle: signup, login, session verification and logout.
///
/// Stateless with respect to sessions: everything needed to check a session
/// lives in the signed token plus a lookup in the user repository.
pub struct SessionService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    issuer: TokenIssuer,
    hasher: CredentialHasher,
    mask_login_failures: bool,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        issuer: TokenIssuer,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            repository,
            issuer,
            hasher,
            mask_login_failures: false,
        }
    }

    /// When set, unknown email and wrong password produce the same message
    pub fn with_masked_login_failures(mut self, mask: bool) -> Self {
        self.mask_login_failures = mask;
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Registers a user and issues their first session token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<EstablishedSession, AppError> {
        info!("Starting signup");

        if self
            .repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            warn!("Signup rejected, email already registered");
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = UserModel::new(request.name, request.email, password_hash);

        // The repository enforces uniqueness again for concurrent signups
        self.repository.create_user(&user).await?;

        let token = self
            .issuer
            .issue(&user.id, &user.email, self.issuer.validity())?;

        info!(user_id = %user.id, "Signup completed");
        Ok(EstablishedSession {
            profile: user.profile(),
            token,
        })
    }

    /// Checks credentials and issues a fresh session token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<EstablishedSession, AppError> {
        info!("Starting login");

        let Some(user) = self.repository.find_by_email(&request.email).await? else {
            warn!("Login rejected, no user for email");
            return Err(self.login_failure(USER_NOT_FOUND));
        };

        let password_matches = match self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await
        {
            Ok(matches) => matches,
            // A corrupt stored hash fails the login rather than the request
            Err(AppError::HashingError(e)) => {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                false
            }
            Err(e) => return Err(e),
        };

        if !password_matches {
            warn!(user_id = %user.id, "Login rejected, incorrect password");
            return Err(self.login_failure(INCORRECT_PASSWORD));
        }

        let token = self
            .issuer
            .issue(&user.id, &user.email, self.issuer.validity())?;

        info!(user_id = %user.id, "Login completed");
        Ok(EstablishedSession {
            profile: user.profile(),
            token,
        })
    }

    /// Resolves a verified token identity to the user it names
    #[instrument(skip(self, identity), fields(user_id = %identity.subject_id))]
    pub async fn verify_session(&self, identity: &SessionIdentity) -> Result<UserProfile, AppError> {
        let user = self.load_matching_user(identity).await?;

        info!("Session verified");
        Ok(user.profile())
    }

    /// Same checks as `verify_session`. Clearing the cookie is up to the caller.
    #[instrument(skip(self, identity), fields(user_id = %identity.subject_id))]
    pub async fn logout(&self, identity: &SessionIdentity) -> Result<UserProfile, AppError> {
        let user = self.load_matching_user(identity).await?;

        info!("Logout accepted");
        Ok(user.profile())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        let users = self.repository.list_users().await?;

        info!(user_count = users.len(), "Listed users");
        Ok(users.iter().map(UserModel::profile).collect())
    }

    async fn load_matching_user(&self, identity: &SessionIdentity) -> Result<UserModel, AppError> {
        let Some(user) = self.repository.find_by_id(&identity.subject_id).await? else {
            warn!("Token subject does not resolve to a user");
            return Err(AppError::Unauthorized(USER_NOT_REGISTERED.to_string()));
        };

        if user.id != identity.subject_id {
            warn!(loaded_id = %user.id, "Loaded user id does not match token subject");
            return Err(AppError::Unauthorized(USER_ID_MISMATCH.to_string()));
        }

        Ok(user)
    }

    fn login_failure(&self, reason: &str) -> AppError {
        if self.mask_login_failures {
            AppError::Unauthorized(INVALID_LOGIN.to_string())
        } else {
            AppError::Unauthorized(reason.to_string())
        }
    }
}
