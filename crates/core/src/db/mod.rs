//! SQLite storage shared by the local cache backend and the log sink.

pub mod connection;
pub mod migrations;

pub use connection::Database;
