//! Identity resolution and the admin gate.
//!
//! Two independent mechanisms protect the routes:
//! * Bearer identity: an opaque token in the `Authorization: Bearer ...` header, resolved to a user record through
//!   [`AuthApi`]. The server never issues tokens and never sees passwords; issuance is an external capability.
//! * Admin gate: a shared secret in the `x-admin-auth` header, compared against `WSS_ADMIN_API_KEY`.
use actix_web::HttpRequest;
use log::debug;
use webstore_engine::{db_types::UserAccount, AuthApi, AuthManagement};

use crate::{config::ServerConfig, errors::ServerError};

pub const ADMIN_AUTH_HEADER: &str = "x-admin-auth";

/// Extracts the bearer token from the `Authorization` header.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, ServerError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ServerError::Unauthenticated("No Authorization header was provided".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| ServerError::Unauthenticated("Authorization header is not valid UTF-8".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::Unauthenticated("Authorization header is not a bearer token".to_string()))
}

/// Resolves the calling user from their bearer token. Unknown tokens yield 401 and banned accounts 403, via the
/// [`ServerError`] conversions.
pub async fn authenticated_user<A: AuthManagement>(
    req: &HttpRequest,
    api: &AuthApi<A>,
) -> Result<UserAccount, ServerError> {
    let token = bearer_token(req)?;
    let user = api.authenticate(token).await?;
    debug!("🔑️ Request authenticated for {} (#{})", user.username, user.id);
    Ok(user)
}

/// True when the request carries the configured admin secret.
pub fn is_admin(req: &HttpRequest, config: &ServerConfig) -> bool {
    let Some(key) = &config.admin_api_key else {
        return false;
    };
    req.headers()
        .get(ADMIN_AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.as_bytes() == key.reveal().as_bytes())
        .unwrap_or(false)
}

pub fn require_admin(req: &HttpRequest, config: &ServerConfig) -> Result<(), ServerError> {
    if is_admin(req, config) {
        Ok(())
    } else {
        Err(ServerError::Forbidden("This route requires the admin API key".to_string()))
    }
}
