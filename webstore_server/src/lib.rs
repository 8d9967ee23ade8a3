//! # Webstore server
//! This module hosts the HTTP layer for the webstore credit and order engine. It is responsible for:
//! resolving bearer tokens to user accounts, gating administrative routes behind a shared secret,
//! translating engine errors into HTTP status codes, and wiring the order-confirmation mail hook.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! All business routes live under `/api` and are listed in [routes](routes/index.html). A `/health` route returns
//! 200 OK for liveness probes.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod mail;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
