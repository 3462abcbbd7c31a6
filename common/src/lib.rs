//! Shared foundation for the datasource metadata connector.
//!
//! Contains the typed error model, introspection configuration, metadata
//! record types, and identifier validation used by the introspection crate.

pub mod config;
pub mod errors;
pub mod models;
pub mod utils;

pub use config::IntrospectionConfig;
pub use errors::{AppError, AppResult};
