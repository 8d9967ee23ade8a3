use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderStatus},
    rate_window::WindowStatus,
};

/// An order admitted through the order flow, together with the caller's remaining quota for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmittedOrder {
    pub order: Order,
    pub remaining: usize,
}

/// Orders for one user plus their remaining quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub orders: Vec<Order>,
    pub remaining: usize,
    pub next_available_at: Option<DateTime<Utc>>,
}

impl OrderResult {
    pub fn new(orders: Vec<Order>, status: WindowStatus) -> Self {
        Self { orders, remaining: status.remaining, next_available_at: status.next_available_at }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub user_id: Option<i64>,
    pub customer_email: Option<String>,
    pub status: Option<Vec<OrderStatus>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() &&
            self.customer_email.is_none() &&
            self.status.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}
