use serde::{Deserialize, Serialize};
use ws_common::Credits;

use crate::traits::AccountApiError;

/// The result of a completed transfer. Balances are as of the commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub recipient_username: String,
    pub amount: Credits,
    pub sender_balance: Credits,
}

/// The only mutation path for credit balances. Implementations must guarantee that no interleaving of these
/// operations can leave any balance negative, or destroy or duplicate credits.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Increases the user's balance by `amount` and returns the new balance. The caller has already validated that
    /// `amount` is strictly positive. Fails with `UserNotFound` for an unknown id.
    async fn credit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError>;

    /// Decreases the user's balance by `amount` and returns the new balance. The balance check and the decrement
    /// must be a single atomic step per user: concurrent debits that would jointly overdraw must fail with
    /// `InsufficientFunds` rather than interleave.
    async fn debit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError>;

    /// Atomically debits the sender and credits the recipient (looked up by username). If the recipient is unknown
    /// the whole operation fails with `RecipientNotFound` and the sender keeps their credits.
    async fn transfer_credits(
        &self,
        from_user_id: i64,
        to_username: &str,
        amount: Credits,
    ) -> Result<TransferOutcome, AccountApiError>;
}
