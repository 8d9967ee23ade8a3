//! Helpers for setting up throwaway databases and seed data in tests.
pub mod prepare_env;
pub mod seed;
