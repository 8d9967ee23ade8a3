use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use ws_common::Credits;

//--------------------------------------    UserAccount      ---------------------------------------------------------
/// A webstore user. `credits` is the live prepaid balance; it is mutated only through the ledger operations on
/// [`crate::traits::LedgerManagement`], never by direct field assignment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
    pub credits: Credits,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seed data for a new user row. Password and token issuance are handled outside the engine; the engine only stores
/// profile and balance state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUserAccount {
    pub username: String,
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
    pub credits: Credits,
}

//--------------------------------------      Service       ---------------------------------------------------------
/// A purchasable catalog entry. The price here is the *current* price; orders snapshot it at admission time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: Credits,
    pub delivery_estimate: Option<String>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewService {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: Credits,
    pub delivery_estimate: Option<String>,
    pub image_url: Option<String>,
}

//--------------------------------------    OrderStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Newly admitted; the debit has already happened.
    Pending,
    /// Work on the order has started.
    Processing,
    /// Fulfilled. Terminal.
    Completed,
    /// Cancelled and refunded. Terminal.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" | "pending" => Ok(Self::Pending),
            "Processing" | "processing" => Ok(Self::Processing),
            "Completed" | "completed" => Ok(Self::Completed),
            "Cancelled" | "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------     LineItem       ---------------------------------------------------------
/// A snapshot of a service as it was priced when the order was placed. Later catalog edits never touch these rows,
/// so an order always shows what was actually charged.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub service_id: i64,
    pub title: String,
    pub category: String,
    pub price: Credits,
    pub delivery_estimate: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub service_id: i64,
    pub title: String,
    pub category: String,
    pub price: Credits,
    pub delivery_estimate: Option<String>,
    pub image_url: Option<String>,
}

impl NewLineItem {
    /// Snapshot the current state of a catalog service into a line item.
    pub fn from_service(service: &Service) -> Self {
        Self {
            service_id: service.id,
            title: service.title.clone(),
            category: service.category.clone(),
            price: service.price,
            delivery_estimate: service.delivery_estimate.clone(),
            image_url: service.image_url.clone(),
        }
    }
}

//--------------------------------------       Order        ---------------------------------------------------------
/// A stored order. The customer fields are a snapshot taken at creation time; later profile edits never
/// retroactively alter historical orders. `total` is recorded once at admission and is authoritative for refunds --
/// it is never recomputed from current catalog prices.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub note: Option<String>,
    pub total: Credits,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<LineItem>,
}

//--------------------------------------      NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: i64,
    /// Customer snapshot, copied from the user record at admission time
    pub username: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    /// Optional free-text note supplied by the customer
    pub note: Option<String>,
    /// The authoritative total, computed server-side from current catalog prices
    pub total: Credits,
    pub items: Vec<NewLineItem>,
}

impl NewOrder {
    pub fn new(user: &UserAccount, items: Vec<NewLineItem>, note: Option<String>) -> Self {
        let total = items.iter().map(|i| i.price).sum();
        Self {
            user_id: user.id,
            username: user.username.clone(),
            customer_name: user.name.clone(),
            customer_email: user.email.clone(),
            customer_address: user.address.clone(),
            note,
            total,
            items,
        }
    }
}
