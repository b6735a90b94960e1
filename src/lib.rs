// Library crate for the session authentication service
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod router;
pub mod session;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::{AuthConfig, ConfigError};
pub use router::{build_router, cors_layer};
pub use session::{CredentialHasher, SessionIdentity, SessionService, TokenIssuer};
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
