//! SQLite backend for the wardwatch store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime.

mod activity;
mod encode;
mod households;
mod listing;
mod schema;
mod store;
mod wards;
mod workers;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
