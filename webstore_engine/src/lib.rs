//! Webstore Credit & Order Engine
//!
//! The engine maintains prepaid credit balances for webstore users and admits new orders against those balances.
//! It is provider-agnostic: all storage access goes through the traits in [`mod@traits`], and the public APIs in
//! [`mod@api`] are generic over any backend that implements them. SQLite is the only backend shipped in-tree.
//!
//! The library is divided into three main sections:
//! 1. Database traits and types ([`mod@traits`], [`mod@db_types`]). You should never need to access the database
//!    directly; use the public APIs instead. The exception is the data types, which are public.
//! 2. The public API ([`mod@api`]). [`OrderFlowApi`] owns order admission and the status lifecycle (including the
//!    refund-on-cancel contract), and [`AccountApi`] owns balance queries and the credit mutations (top-up, deduct,
//!    transfer).
//! 3. An event hook system ([`mod@events`]). Hooks fire on order creation and cancellation so that side effects like
//!    confirmation mail stay fully decoupled from admission: a slow or failing hook can never fail an order.
pub mod api;
pub mod db_types;
pub mod events;
pub mod rate_window;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    order_flow_api::OrderFlowApi,
    order_objects,
};
pub use rate_window::{RateWindow, WindowStatus, ORDER_QUOTA, ORDER_WINDOW};
pub use traits::{
    AccountApiError,
    AccountManagement,
    AuthApiError,
    AuthManagement,
    LedgerManagement,
    OrderFlowError,
    TransferOutcome,
    WebstoreDatabase,
};
