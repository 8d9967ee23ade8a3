use thiserror::Error;

use crate::db_types::UserAccount;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Unknown access token")]
    TokenNotFound,
    #[error("This account has been banned")]
    AccountBanned,
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Resolves opaque bearer tokens to user records. The engine never issues tokens and never sees passwords; it only
/// consumes the identity capability.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Fetches the user owning the given access token, or `None` if the token is unknown.
    async fn fetch_user_for_token(&self, token: &str) -> Result<Option<UserAccount>, AuthApiError>;
}
