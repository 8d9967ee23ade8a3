//! `SqliteDatabase` is a concrete implementation of a webstore engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;
use ws_common::Credits;

use super::db::{auth, db_url, new_pool, orders, services, users};
use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, NewService, NewUserAccount, Order, OrderStatus, Service, UserAccount},
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        LedgerManagement,
        OrderFlowError,
        TransferOutcome,
        WebstoreDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl WebstoreDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} has been saved in the DB for user #{}", order.id, order.user_id);
        Ok(order)
    }

    /// Cancels the order and refunds its recorded total in a single transaction. The status write inside
    /// [`orders::cancel_and_refund`] is keyed on the order being non-terminal, so a repeat call is a no-op that
    /// returns `(order, false)` and the user is never refunded twice.
    async fn cancel_order_with_refund(&self, order_id: i64) -> Result<(Order, bool), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let (order, refunded) = orders::cancel_and_refund(order_id, &mut tx).await?;
        tx.commit().await?;
        if refunded {
            debug!("🗃️ Order #{order_id} cancelled and {} refunded to user #{}", order.total, order.user_id);
        }
        Ok((order, refunded))
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        debug!("🗃️ Order #{order_id} is now {status}");
        Ok(order)
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete_order(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn delete_orders_for_user(&self, user_id: i64) -> Result<u64, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let count = orders::delete_orders_for_user(user_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Deleted {count} orders for user #{user_id}");
        Ok(count)
    }

    async fn delete_orders_by_ids(&self, order_ids: &[i64]) -> Result<u64, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let count = orders::delete_orders_by_ids(order_ids, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Deleted {count} of {} requested orders", order_ids.len());
        Ok(count)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_id(user_id, &mut conn).await
    }

    async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_email(email, &mut conn).await
    }

    async fn fetch_user_account_for_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_username(username, &mut conn).await
    }

    async fn fetch_balance(&self, user_id: i64) -> Result<Credits, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_balance(user_id, &mut conn).await
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(order_id, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_timestamps_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::order_timestamps_since(user_id, since, &mut conn).await
    }

    async fn count_orders_for_user(&self, user_id: i64) -> Result<u64, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::count_orders_for_user(user_id, &mut conn).await
    }

    async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        services::fetch_service(service_id, &mut conn).await
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn credit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::credit(user_id, amount, &mut conn).await
    }

    async fn debit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::debit(user_id, amount, &mut conn).await
    }

    /// Debits the sender and credits the recipient in one transaction. If the recipient username does not resolve,
    /// the transaction rolls back and the sender keeps their credits.
    async fn transfer_credits(
        &self,
        from_user_id: i64,
        to_username: &str,
        amount: Credits,
    ) -> Result<TransferOutcome, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let sender_balance = users::debit(from_user_id, amount, &mut tx).await?;
        let recipient = users::user_by_username(to_username, &mut tx)
            .await?
            .ok_or_else(|| AccountApiError::RecipientNotFound(to_username.to_string()))?;
        users::credit(recipient.id, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transferred {amount} from user #{from_user_id} to {to_username}");
        Ok(TransferOutcome {
            sender_id: from_user_id,
            recipient_id: recipient.id,
            recipient_username: recipient.username,
            amount,
            sender_balance,
        })
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_user_for_token(&self, token: &str) -> Result<Option<UserAccount>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        auth::fetch_user_for_token(token, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a user account row. Used by seeding and tests; account provisioning is otherwise external.
    pub async fn insert_account(&self, account: NewUserAccount) -> Result<UserAccount, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_account(account, &mut conn).await
    }

    /// Adds a catalog service.
    pub async fn insert_service(&self, service: NewService) -> Result<Service, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        services::insert_service(service, &mut conn).await
    }

    /// Marks a catalog service inactive.
    pub async fn deactivate_service(&self, service_id: i64) -> Result<bool, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        services::deactivate_service(service_id, &mut conn).await
    }

    /// Registers an access token for a user.
    pub async fn insert_access_token(&self, user_id: i64, token: &str) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        auth::insert_token(user_id, token, &mut conn).await
    }
}
