//! Database layer for review records
//!
//! SQLite schema creation plus the queries behind the record store.

pub mod init;
pub mod reviews;

pub use init::{init_database, init_memory_database};
