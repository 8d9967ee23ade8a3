use std::{collections::HashMap, fmt::Debug, sync::Arc};

use chrono::Utc;
use log::*;
use tokio::sync::Mutex;
use ws_common::Credits;

use crate::{
    api::order_objects::{AdmittedOrder, OrderResult},
    db_types::{NewLineItem, NewOrder, Order, OrderStatus, UserAccount},
    events::{EventProducers, OrderCancelledEvent, OrderCreatedEvent},
    rate_window::{RateWindow, WindowStatus},
    traits::{AccountManagement, OrderFlowError, WebstoreDatabase},
};

/// `OrderFlowApi` is the primary API for handling order flows: admission of new orders against the credit ledger
/// and the rate window, and the status lifecycle including the refund-on-cancel contract.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    window: RateWindow,
    // Serializes the whole admission sequence per user. The original storefront had no such lock and could admit
    // one order over quota under a race; see DESIGN.md.
    admission_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, window: RateWindow::default(), admission_locks: Mutex::new(HashMap::new()) }
    }

    /// Replace the default quota/window. Used by tests; production uses the defaults.
    pub fn with_rate_window(mut self, window: RateWindow) -> Self {
        self.window = window;
        self
    }
}

impl<B> OrderFlowApi<B>
where B: WebstoreDatabase
{
    /// Submit a new order on behalf of `user`.
    ///
    /// The admission sequence, checked in order (fail fast, cheapest first):
    /// 1. `items` is non-empty and every id resolves to an active catalog service. The line-item prices are
    ///    snapshotted from the catalog's *current* prices; a client-supplied total is never trusted.
    /// 2. The total is the sum of the snapshotted prices.
    /// 3. The rate window must have quota remaining, otherwise `RateLimited` with the retry hint.
    /// 4. The user's balance must cover the total, otherwise `InsufficientFunds`.
    /// 5. The ledger is debited, then the order is persisted. If persistence fails after the debit succeeded, a
    ///    compensating credit reverses it so the user is never charged for a non-existent order. A failed
    ///    compensation escalates to `RollbackFailed` and logs everything needed for manual reconciliation.
    ///
    /// The whole sequence holds a per-user lock, so concurrent submissions from one user cannot overrun the quota.
    /// On success the `OrderCreated` hook fires (best-effort; a hook failure never fails the order) and the stored
    /// order is returned together with the user's remaining quota.
    pub async fn submit_order(
        &self,
        user: &UserAccount,
        service_ids: &[i64],
        note: Option<String>,
    ) -> Result<AdmittedOrder, OrderFlowError> {
        if service_ids.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }
        let mut items = Vec::with_capacity(service_ids.len());
        for &id in service_ids {
            let service = self
                .db
                .fetch_service(id)
                .await?
                .filter(|s| s.active)
                .ok_or(OrderFlowError::UnknownService(id))?;
            items.push(NewLineItem::from_service(&service));
        }
        let total: Credits = items.iter().map(|i| i.price).sum();

        let lock = self.admission_lock(user.id).await;
        let _guard = lock.lock().await;

        let status = self.cooldown_status(user.id).await?;
        if status.is_exhausted() {
            let next_available_at = status.next_available_at.unwrap_or_else(Utc::now);
            debug!("📦️ User #{} hit the order quota. Next slot at {next_available_at}", user.id);
            return Err(OrderFlowError::RateLimited { next_available_at });
        }
        let balance = self.db.fetch_balance(user.id).await?;
        if balance < total {
            debug!("📦️ User #{} has {balance} but the order totals {total}. Rejecting.", user.id);
            return Err(crate::traits::AccountApiError::InsufficientFunds.into());
        }

        self.db.debit_account(user.id, total).await?;
        let new_order = NewOrder::new(user, items, note);
        let order = match self.db.insert_order(new_order.clone()).await {
            Ok(order) => order,
            Err(e) => {
                warn!("📦️ Order persistence failed for user #{} after a debit of {total}: {e}. Reversing.", user.id);
                return match self.db.credit_account(user.id, total).await {
                    Ok(_) => Err(e),
                    Err(credit_err) => {
                        let payload = serde_json::to_string(&new_order).unwrap_or_else(|_| format!("{new_order:?}"));
                        error!(
                            "📦️🚨️ Compensating credit of {total} for user #{} failed: {credit_err}. Order payload: \
                             {payload}",
                            user.id
                        );
                        Err(OrderFlowError::RollbackFailed {
                            user_id: user.id,
                            amount: total,
                            reason: credit_err.to_string(),
                        })
                    },
                };
            },
        };
        debug!("📦️ Order #{} admitted for user #{}. Charged {total}.", order.id, user.id);
        self.call_order_created_hook(&order).await;
        Ok(AdmittedOrder { order, remaining: status.remaining.saturating_sub(1) })
    }

    /// Changes the status of an order.
    ///
    /// | From \ To  | Pending | Processing | Completed | Cancelled |
    /// |------------|---------|------------|-----------|-----------|
    /// | Pending    | Err     | ok         | ok        | refund    |
    /// | Processing | Err     | Err        | ok        | refund    |
    /// | Completed  | Err     | Err        | Err       | Err       |
    /// | Cancelled  | Err     | Err        | Err       | no-op     |
    ///
    /// A transition into `Cancelled` from a non-terminal state credits the order's recorded total back to the user
    /// and persists the new status as one atomic unit. Cancelling an already-cancelled order is a no-op with
    /// respect to the ledger: it returns the order unchanged, so cancelling twice never refunds twice. All other
    /// transitions are plain status writes or `TransitionForbidden`.
    pub async fn update_order_status(&self, order_id: i64, new_status: OrderStatus) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        use OrderStatus::*;
        match (order.status, new_status) {
            (Cancelled, Cancelled) => {
                debug!("📦️ Order #{order_id} is already cancelled. Nothing to do.");
                Ok(order)
            },
            (old, new) if old == new => Err(OrderFlowError::StatusUnchanged),
            (Pending | Processing, Cancelled) => self.cancel_order(order_id).await,
            (Pending, Processing | Completed) | (Processing, Completed) => {
                self.db.update_order_status(order_id, new_status).await
            },
            (from, to) => {
                if from.is_terminal() {
                    debug!("📦️ Order #{order_id} is {from}, which is terminal. Refusing change to {to}.");
                }
                Err(OrderFlowError::TransitionForbidden { from, to })
            },
        }
    }

    async fn cancel_order(&self, order_id: i64) -> Result<Order, OrderFlowError> {
        let (order, refunded) = self.db.cancel_order_with_refund(order_id).await?;
        if refunded {
            info!("📦️ Order #{order_id} cancelled. Refunded {} to user #{}.", order.total, order.user_id);
            self.call_order_cancelled_hook(&order).await;
        }
        Ok(order)
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            trace!("📦️📬️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_order_cancelled_hook(&self, order: &Order) {
        for emitter in &self.producers.order_cancelled_producer {
            trace!("📦️📬️ Notifying order cancelled hook subscribers");
            emitter.publish_event(OrderCancelledEvent::new(order.clone())).await;
        }
    }

    async fn admission_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.admission_locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }
}

// The read side only needs account queries, which also keeps these methods available to callers holding a
// query-only backend.
impl<B> OrderFlowApi<B>
where B: AccountManagement
{
    /// The user's current rate-window standing, computed from actual order timestamps. Consumed by admission and by
    /// the standalone cooldown endpoint.
    pub async fn cooldown_status(&self, user_id: i64) -> Result<WindowStatus, OrderFlowError> {
        let now = Utc::now();
        let stamps = self.db.fetch_order_timestamps_since(user_id, self.window.cutoff(now)).await?;
        Ok(self.window.assess(now, &stamps))
    }

    /// The user's orders (newest first) together with their remaining quota.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<OrderResult, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        let status = self.cooldown_status(user_id).await?;
        Ok(OrderResult::new(orders, status))
    }
}

impl<B> OrderFlowApi<B> {
    pub fn db(&self) -> &B {
        &self.db
    }
}
