//! Repository implementations backed by PostgreSQL.

pub mod plugin;

pub use plugin::PgPluginStore;
