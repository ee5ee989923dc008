//! # plughub-database
//!
//! PostgreSQL connection management and the durable plugin record store.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::PgPluginStore;
