//! Database module
//!
//! Handles SQLite connection, migrations and shared column codecs.

pub mod connection;
pub mod migrations;
pub mod row;

pub use connection::{Database, DbError, DbResult};
