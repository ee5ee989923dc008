//! Core traits shared across PlugHub crates.

pub mod plugin_store;

pub use plugin_store::{PluginRecord, PluginRecordUpdate, PluginStore};
