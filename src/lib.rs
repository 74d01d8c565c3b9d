//! leio: a personal reading log with a month-grouped cover gallery.
//!
//! Books are recorded with a reading month, a 1-5 rating, a synopsis and a
//! cover image. The whole collection lives as one JSON document in a
//! key-value backend (SQLite by default) and is served through a small web
//! interface and JSON API.
//!
//! # Features
//!
//! - Month-grouped gallery with per-month navigation
//! - Add-book form with field validation
//! - Uploaded covers stored inline as data URLs
//! - Generated placeholder covers for books without one
//! - CLI for adding and listing books offline

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Cover payloads and placeholder generation.
pub mod cover;
/// Error types.
pub mod error;
/// Book records and the book store.
pub mod library;
/// HTTP server.
pub mod server;
/// Key-value storage backends.
pub mod storage;


pub use config::{Cli, Command, Config};
pub use error::{AppError, Result};
pub use library::{Book, BookStore};
pub use server::AppState;
pub use storage::{KeyValueStore, SqliteStore};
