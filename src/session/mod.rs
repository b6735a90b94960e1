// Public API - what other modules can use
pub use handlers::{list_users, login, logout, signup, verify_session};
pub use middleware::require_session;
pub use password::CredentialHasher;
pub use service::SessionService;
pub use token::TokenIssuer;
pub use types::{SessionClaims, SessionIdentity};

// Internal modules
pub mod cookie;
mod handlers;
mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod types;
