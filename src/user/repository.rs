use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
///
/// `create_user` must be atomic create-if-absent on `email`: when another user
/// already holds the email it fails with `AppError::Conflict` and stores nothing.
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError>;
    /// Returns false when no user had that id
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let user_map = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Self {
            users: Mutex::new(user_map),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<String, UserModel>>, AppError> {
        self.users.lock().map_err(|_| {
            warn!("User store lock poisoned");
            AppError::Internal
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!("Creating user in memory");

        // Check and insert under the same lock
        let mut users = self.users()?;
        if users.values().any(|existing| existing.email == user.email) {
            warn!("Email already registered in memory");
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        if users.contains_key(&user.id) {
            warn!("User id already exists in memory");
            return Err(AppError::DatabaseError("User id already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        debug!("User created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users()?;
        let user = users.values().find(|user| user.email == email).cloned();

        debug!(found = user.is_some(), "Looked up user by email in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let user = self.users()?.get(user_id).cloned();

        debug!(found = user.is_some(), "Looked up user by id in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let mut users: Vec<UserModel> = self.users()?.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        debug!(user_count = users.len(), "Listed users from memory");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        let removed = self.users()?.remove(user_id).is_some();

        debug!(removed, "Deleted user from memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the users table when it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to ensure users schema");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!("Users schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!("Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!("Email already registered in database");
                AppError::Conflict("User already exists".to_string())
            }
            e => {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        debug!("User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(found = user.is_some(), "Looked up user by email in database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by id from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(found = user.is_some(), "Looked up user by id in database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let users = sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash, created_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list users from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_count = users.len(), "Listed users from database");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        let removed = result.rows_affected() > 0;
        debug!(removed, "Deleted user from database");
        Ok(removed)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_test_user(name: &str, email: &str) -> UserModel {
        UserModel::new(name.to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Ada", "ada@example.com");

        repo.create_user(&user).await.unwrap();

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.find_by_id("nonexistent-id").await.unwrap().is_none());
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&create_test_user("Ada", "ada@example.com"))
            .await
            .unwrap();

        assert!(repo.find_by_email("ADA@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&create_test_user("Ada", "ada@example.com"))
            .await
            .unwrap();

        let result = repo
            .create_user(&create_test_user("Other Ada", "ada@example.com"))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_email() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.create_user(&create_test_user(&format!("user-{}", i), "race@example.com"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Ada", "ada@example.com");
        repo.create_user(&user).await.unwrap();

        assert!(repo.delete_user(&user.id).await.unwrap());
        assert!(repo.find_by_id(&user.id).await.unwrap().is_none());
        assert!(!repo.delete_user(&user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_users_with_preloaded_users() {
        let users = vec![
            create_test_user("A", "a@example.com"),
            create_test_user("B", "b@example.com"),
            create_test_user("C", "c@example.com"),
        ];
        let repo = InMemoryUserRepository::with_users(users.clone());

        assert_eq!(repo.user_count(), 3);
        let listed = repo.list_users().await.unwrap();
        assert_eq!(listed.len(), 3);
        for user in &users {
            assert!(listed.iter().any(|u| u.id == user.id));
        }
    }
}
