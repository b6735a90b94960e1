pub mod models;
pub mod repository;

pub use models::{UserModel, UserProfile};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
