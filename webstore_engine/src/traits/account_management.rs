use chrono::{DateTime, Utc};
use thiserror::Error;
use ws_common::Credits;

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{Order, Service, UserAccount},
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("User account not found")]
    UserNotFound,
    #[error("No user with username {0}")]
    RecipientNotFound(String),
    #[error("Not enough credits")]
    InsufficientFunds,
    #[error("Amount must be strictly positive, got {0}")]
    InvalidAmount(Credits),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over user accounts, orders and the service catalog. Mutation of balances lives on
/// [`crate::traits::LedgerManagement`]; order writes live on [`crate::traits::WebstoreDatabase`].
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account for the given id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_user_account_for_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError>;

    /// The user's current credit balance. Fails with `UserNotFound` for an unknown id.
    async fn fetch_balance(&self, user_id: i64) -> Result<Credits, AccountApiError>;

    /// Fetches an order, including its line-item snapshots.
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;

    /// All orders for the user, newest first, line items included.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;

    /// Creation timestamps of the user's orders at or after `since`, for the rate window. Cheaper than loading full
    /// order records.
    async fn fetch_order_timestamps_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AccountApiError>;

    async fn count_orders_for_user(&self, user_id: i64) -> Result<u64, AccountApiError>;

    /// Fetches a catalog service by id, whether or not it is active.
    async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError>;
}
