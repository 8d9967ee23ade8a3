use sqlx::SqliteConnection;

use crate::{db_types::UserAccount, traits::AuthApiError};

/// Resolves an opaque bearer token to its owning user. Token issuance happens outside the engine; this table only
/// stores tokens that have already been handed out.
pub async fn fetch_user_for_token(
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, AuthApiError> {
    let user = sqlx::query_as(
        "SELECT users.* FROM users INNER JOIN access_tokens ON users.id = access_tokens.user_id WHERE \
         access_tokens.token = $1",
    )
    .bind(token)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub async fn insert_token(user_id: i64, token: &str, conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    sqlx::query("INSERT INTO access_tokens (user_id, token) VALUES ($1, $2)")
        .bind(user_id)
        .bind(token)
        .execute(conn)
        .await?;
    Ok(())
}
