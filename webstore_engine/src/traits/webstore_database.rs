use chrono::{DateTime, Utc};
use thiserror::Error;
use ws_common::Credits;

use crate::{
    db_types::{NewOrder, Order, OrderStatus},
    traits::{AccountApiError, AccountManagement, AuthManagement, LedgerManagement},
};

/// The top-level contract for engine backends.
///
/// This behaviour includes:
/// * persisting admitted orders (the debit has already happened when `insert_order` is called),
/// * the refund-on-cancel write, which must be atomic and idempotent,
/// * plain status writes for the rest of the lifecycle,
/// * the administrative delete operations, which are record purges and deliberately have no ledger effect.
#[allow(async_fn_in_trait)]
pub trait WebstoreDatabase: Clone + AccountManagement + LedgerManagement + AuthManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Persists a new order and its line-item snapshots in a single atomic transaction, assigning the id and
    /// `created_at`. Returns the stored order with items populated.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Cancels the order and refunds its recorded total, in one atomic transaction.
    ///
    /// The status write is keyed on the order currently being in a non-terminal state, so calling this twice can
    /// never refund twice. Returns the updated order and `true` if this call performed the cancellation, or the
    /// unchanged order and `false` if it was already cancelled. Fails with `TransitionForbidden` when the order is
    /// `Completed`.
    async fn cancel_order_with_refund(&self, order_id: i64) -> Result<(Order, bool), OrderFlowError>;

    /// A plain status write with no ledger effect. Lifecycle legality is checked by the caller
    /// ([`crate::OrderFlowApi`]); this is pure persistence.
    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderFlowError>;

    /// Deletes a single order. Returns `false` if it did not exist. No refund: deletion is a record purge, not a
    /// cancellation.
    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError>;

    /// Deletes all orders belonging to the user. Returns the number of deleted orders. No refunds.
    async fn delete_orders_for_user(&self, user_id: i64) -> Result<u64, OrderFlowError>;

    /// Deletes the given orders. Returns the number of deleted orders. No refunds.
    async fn delete_orders_by_ids(&self, order_ids: &[i64]) -> Result<u64, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Item {0} does not resolve to an active service")]
    UnknownService(i64),
    #[error("Order quota exhausted; next order possible at {next_available_at}")]
    RateLimited { next_available_at: DateTime<Utc> },
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Status change from {from} to {to} is not allowed")]
    TransitionForbidden { from: OrderStatus, to: OrderStatus },
    #[error("The requested status change would be a no-op")]
    StatusUnchanged,
    #[error(
        "Could not roll back debit of {amount} for user {user_id} after order persistence failed: {reason}. Manual \
         reconciliation required."
    )]
    RollbackFailed { user_id: i64, amount: Credits, reason: String },
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl OrderFlowError {
    /// True for the expected business-rule rejections (as opposed to system faults).
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            OrderFlowError::EmptyOrder |
                OrderFlowError::UnknownService(_) |
                OrderFlowError::RateLimited { .. } |
                OrderFlowError::AccountError(AccountApiError::InsufficientFunds) |
                OrderFlowError::TransitionForbidden { .. }
        )
    }
}
