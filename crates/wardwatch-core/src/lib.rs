//! Core types and trait definitions for the wardwatch waste-management
//! dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod activity;
pub mod envelope;
pub mod error;
pub mod household;
pub mod patch;
pub mod query;
pub mod store;
pub mod ward;
pub mod worker;

pub use error::{Entity, Error, Result};
pub use patch::Patch;
