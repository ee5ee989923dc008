//! # plughub-core
//!
//! Core crate for PlugHub. Contains the unified error system,
//! configuration schemas, and the durable plugin record contract.
//!
//! This crate has **no** internal dependencies on other PlugHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind, HookExecutionError};
pub use result::AppResult;
