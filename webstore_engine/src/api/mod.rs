//! # Engine public API
//!
//! The API is modular so that clients can pick the functionality they need:
//!
//! * [`accounts_api`] provides account queries and the credit mutations (top-up, deduct, transfer).
//! * [`order_flow_api`] is the primary API for order admission and the status lifecycle.
//! * [`auth_api`] resolves bearer tokens to user records.
//!
//! The pattern for all of them is the same: an API instance is created by supplying a backend that implements the
//! required traits.
//!
//! ```rust,ignore
//! use webstore_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(url, 25).await?;
//! let api = AccountApi::new(db);
//! let account = api.account_by_email("someone@example.com").await?;
//! ```
pub mod accounts_api;
pub mod auth_api;
pub mod order_flow_api;
pub mod order_objects;
