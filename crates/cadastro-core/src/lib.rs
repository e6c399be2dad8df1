//! Core types and trait definitions for the Cadastro patient registry.
//!
//! This crate is free of database and XML dependencies. The SQLite backend,
//! the XML interchange codec and the command-line front end all depend on it.

pub mod error;
pub mod form;
pub mod patient;
pub mod plan;
pub mod store;

pub use error::{Error, Result};
