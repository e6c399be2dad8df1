//! SQLite backend for the Cadastro patient registry.
//!
//! One blocking [`rusqlite::Connection`] per store. The registry is a
//! single-user desktop database, so every call runs on the caller's thread.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
