//! Network MCP Hub library exports

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;

pub use error::CatalogError;
