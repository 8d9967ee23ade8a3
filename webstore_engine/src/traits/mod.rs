//! # Database traits
//!
//! This module defines the interface contracts that storage *backends* must satisfy.
//!
//! * [`WebstoreDatabase`] is the top-level mutating contract: order admission, the status lifecycle, and the
//!   administrative delete operations.
//! * [`LedgerManagement`] is the only path through which a balance may change. Backends must make the
//!   check-then-decrement of a debit atomic per user, so that concurrent debits can never jointly overdraw.
//! * [`AccountManagement`] provides read-only queries over users, orders and the catalog.
//! * [`AuthManagement`] resolves an opaque bearer token to the owning user record. Token issuance lives outside the
//!   engine.
mod account_management;
mod auth_management;
mod ledger_management;
mod webstore_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use ledger_management::{LedgerManagement, TransferOutcome};
pub use webstore_database::{OrderFlowError, WebstoreDatabase};
