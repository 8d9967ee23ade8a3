//! Unified API for accessing accounts and mutating credit balances.

use std::fmt::Debug;

use log::debug;
use ws_common::Credits;

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{Order, UserAccount},
    traits::{AccountApiError, AccountManagement, LedgerManagement, TransferOutcome},
};

/// The `AccountApi` provides account queries and the three user-facing credit operations: top-up, deduct and
/// transfer. Amount validation happens here, so that backends can assume strictly positive amounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B>
where B: AccountManagement + LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the user account for the given id. If no account exists, `None` is returned.
    pub async fn account_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account(user_id).await
    }

    pub async fn account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account_for_email(email).await
    }

    pub async fn account_by_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account_for_username(username).await
    }

    pub async fn balance(&self, user_id: i64) -> Result<Credits, AccountApiError> {
        self.db.fetch_balance(user_id).await
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_id(order_id).await
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn count_orders_for_user(&self, user_id: i64) -> Result<u64, AccountApiError> {
        self.db.count_orders_for_user(user_id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        self.db.search_orders(query).await
    }

    /// Adds `amount` to the user's balance and returns the new balance.
    pub async fn top_up(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError> {
        check_amount(amount)?;
        let balance = self.db.credit_account(user_id, amount).await?;
        debug!("💳️ Topped up user #{user_id} by {amount}. New balance: {balance}");
        Ok(balance)
    }

    /// Removes `amount` from the user's balance and returns the new balance. Fails with `InsufficientFunds` when
    /// the balance is too low; the balance is then unchanged.
    pub async fn deduct(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError> {
        check_amount(amount)?;
        let balance = self.db.debit_account(user_id, amount).await?;
        debug!("💳️ Deducted {amount} from user #{user_id}. New balance: {balance}");
        Ok(balance)
    }

    /// Moves `amount` from one user to another. Both sides are updated atomically: a failure on either side leaves
    /// both balances untouched, so credits are never destroyed or duplicated.
    pub async fn transfer(
        &self,
        from_user_id: i64,
        to_username: &str,
        amount: Credits,
    ) -> Result<TransferOutcome, AccountApiError> {
        check_amount(amount)?;
        let outcome = self.db.transfer_credits(from_user_id, to_username, amount).await?;
        debug!(
            "💳️ Transferred {amount} from user #{from_user_id} to {} (#{})",
            outcome.recipient_username, outcome.recipient_id
        );
        Ok(outcome)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn check_amount(amount: Credits) -> Result<(), AccountApiError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(AccountApiError::InvalidAmount(amount))
    }
}
