//! bookhunt: a small book catalog with mood-based filters.
//!
//! The server lists books, accepts admin submissions with optional cover
//! uploads and records reader comments. Books are described by free-form
//! atmosphere, pace, hero archetype and style tags that the catalog page and
//! the terminal client filter on.
//!
//! # Features
//!
//! - JSON API for listing, book creation and comments
//! - SQLite storage, or JSON files when no database is available
//! - Server-rendered catalog page with filters and browser-side favorites
//! - Terminal client with local favorites and an offline seed dataset

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Catalog model, filters and favorites.
pub mod catalog;
/// Terminal client.
pub mod client;
/// Configuration and CLI.
pub mod config;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// HTTP server.
pub mod server;
/// Storage backends.
pub mod storage;

#[cfg(test)]
mod tests;

pub use config::{Backend, Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
pub use storage::Storage;
