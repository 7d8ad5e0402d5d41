//! Transit Catalog Library
//!
//! A Rust client for Mobility-Database-compatible transit data catalogs.
//! Provides typed access to feeds, datasets, and search, plus the
//! coordination machinery for the supporting files a feed view carries.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{CatalogError, Result};
