//! SQLite backend for the Stitch Space store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Aggregates (average rating, comment
//! and follow counts) are computed with sub-selects on every read.

mod aggregate;
mod encode;
mod listing;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
