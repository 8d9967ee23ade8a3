use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::UserAccount,
    traits::{AuthApiError, AuthManagement},
};

/// Resolves bearer tokens to user records. Banned accounts authenticate but are rejected, so that the caller can
/// render a precise message.
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Resolves the token to the caller's own user record. Fails with `TokenNotFound` for an unknown token and
    /// `AccountBanned` for a banned user.
    pub async fn authenticate(&self, token: &str) -> Result<UserAccount, AuthApiError> {
        let user = self.db.fetch_user_for_token(token).await?.ok_or(AuthApiError::TokenNotFound)?;
        if user.is_banned {
            debug!("🔑️ Rejected banned account {}", user.username);
            return Err(AuthApiError::AccountBanned);
        }
        Ok(user)
    }
}
