use std::sync::Arc;

use axum::Router;
use axum_extra::extract::cookie::Key;
use chrono::Duration;

use session_gate::{
    build_router, AppState, CredentialHasher, InMemoryUserRepository, SessionService, TokenIssuer,
};

pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret-0123456789";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub issuer: TokenIssuer,
    pub cookie_key: Key,
}

pub struct TestAppBuilder {
    mask_login_failures: bool,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            mask_login_failures: false,
        }
    }

    #[allow(dead_code)]
    pub fn with_masked_login_failures(mut self) -> Self {
        self.mask_login_failures = true;
        self
    }

    pub fn build(self) -> TestApp {
        let repository = Arc::new(InMemoryUserRepository::new());
        let issuer = TokenIssuer::new(TEST_JWT_SECRET, Duration::days(7));
        let cookie_key = Key::generate();

        // Cheap parameters keep the suite fast; production uses the defaults
        let hasher = CredentialHasher::with_params(1024, 1, 1).unwrap();
        let service = SessionService::new(repository.clone(), issuer.clone(), hasher)
            .with_masked_login_failures(self.mask_login_failures);

        let state = AppState::from_parts(Arc::new(service), cookie_key.clone());

        TestApp {
            router: build_router(state),
            repository,
            issuer,
            cookie_key,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
