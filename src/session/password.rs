use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// One-way password hashing with Argon2id.
///
/// Cost parameters are fixed per hasher. Every hash gets a fresh random salt,
/// so hashing the same password twice yields different digests. The async
/// methods move the work onto tokio's blocking pool.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Memory cost in KiB, iteration count and lanes
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AppError::HashingError(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::HashingError(e.to_string()))
    }

    /// Ok(false) on mismatch; Err only when `digest` is not a usable hash
    pub fn verify_blocking(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
        let parsed =
            PasswordHash::new(digest).map_err(|e| AppError::HashingError(e.to_string()))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(AppError::HashingError(e.to_string())),
        }
    }

    #[instrument(skip_all)]
    pub async fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();

        let digest = tokio::task::spawn_blocking(move || hasher.hash_blocking(&plaintext))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password hashing task failed");
                AppError::Internal
            })??;

        debug!("Password hashed");
        Ok(digest)
    }

    #[instrument(skip_all)]
    pub async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        let digest = digest.to_string();

        tokio::task::spawn_blocking(move || hasher.verify_blocking(&plaintext, &digest))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password verification task failed");
                AppError::Internal
            })?
    }
}
