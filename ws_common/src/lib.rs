mod credits;

pub mod op;
mod secret;

pub use credits::{Credits, CreditsConversionError};
pub use secret::Secret;
