use log::trace;
use sqlx::SqliteConnection;
use ws_common::Credits;

use crate::{
    db_types::{NewUserAccount, UserAccount},
    traits::AccountApiError,
};

pub async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, AccountApiError> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, AccountApiError> {
    let user = sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn user_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, AccountApiError> {
    let user = sqlx::query_as("SELECT * FROM users WHERE username = $1").bind(username).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Credits, AccountApiError> {
    let balance: Option<i64> =
        sqlx::query_scalar("SELECT credits FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    balance.map(Credits::from).ok_or(AccountApiError::UserNotFound)
}

pub async fn insert_account(
    account: NewUserAccount,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, AccountApiError> {
    let user = sqlx::query_as(
        r#"
            INSERT INTO users (username, name, email, contact_number, address, credits)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(account.username)
    .bind(account.name)
    .bind(account.email)
    .bind(account.contact_number)
    .bind(account.address)
    .bind(account.credits.value())
    .fetch_one(conn)
    .await?;
    Ok(user)
}

/// Adds `amount` to the user's balance, returning the new balance. The amount has been validated as strictly
/// positive by the caller.
pub async fn credit(user_id: i64, amount: Credits, conn: &mut SqliteConnection) -> Result<Credits, AccountApiError> {
    let balance: Option<i64> = sqlx::query_scalar(
        "UPDATE users SET credits = credits + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING credits",
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    trace!("💳️ Credited {amount} to user #{user_id}");
    balance.map(Credits::from).ok_or(AccountApiError::UserNotFound)
}

/// Subtracts `amount` from the user's balance, returning the new balance.
///
/// The balance guard lives in the WHERE clause, so the check and the decrement are a single atomic statement.
/// Two concurrent debits can never interleave their way past the non-negative invariant; the loser simply matches
/// no row and fails with `InsufficientFunds`.
pub async fn debit(user_id: i64, amount: Credits, conn: &mut SqliteConnection) -> Result<Credits, AccountApiError> {
    let balance: Option<i64> = sqlx::query_scalar(
        "UPDATE users SET credits = credits - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND credits >= $1 \
         RETURNING credits",
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    match balance {
        Some(b) => {
            trace!("💳️ Debited {amount} from user #{user_id}");
            Ok(Credits::from(b))
        },
        // No row matched: either the user does not exist, or the balance could not cover the debit.
        None => {
            let _ = fetch_balance(user_id, conn).await?;
            Err(AccountApiError::InsufficientFunds)
        },
    }
}
