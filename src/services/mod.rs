// Service exports
pub mod auth;
pub mod postgres;
pub mod ranking;

pub use auth::{AuthError, AuthService, Claims, Identity};
pub use postgres::{PostgresClient, StoreError};
pub use ranking::{MistralClient, RankingError};
