//! Domain model types (pure).
//!
//! The viewer works on untyped JSON objects; typed hosts bring their own row
//! type and only use the library modules.

pub mod error;
pub mod key_action;

pub use error::{AppError, InputError};
pub use key_action::KeyAction;

/// One dataset row: a JSON object keyed by column id.
pub type Record = serde_json::Map<String, serde_json::Value>;
