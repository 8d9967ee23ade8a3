use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Fired after an order has been admitted and persisted. Subscribers typically send the confirmation mail; they run
/// fully decoupled from admission, so a subscriber failure can never fail or roll back the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired after a cancellation that refunded the order's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order: Order,
}

impl OrderCancelledEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
