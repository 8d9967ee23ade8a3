//! SQLite database module for the webstore engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
