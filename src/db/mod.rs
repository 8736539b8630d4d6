pub mod connection;
pub mod helpers;
mod migrations;
mod repositories;

pub use connection::Database;
