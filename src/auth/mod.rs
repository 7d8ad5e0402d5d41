//! Authentication management for the catalog API token
//!
//! This module provides functions for managing the bearer token used against
//! the catalog API, including interactive setup, verification, and secure
//! storage in .env files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use transit_catalog::app::CatalogClient;
//! use transit_catalog::auth::{check_token, setup_token};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new()?;
//!
//! // Check if a token is available
//! if !check_token() {
//!     println!("Setting up token...");
//!     setup_token(&client).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod token;

// Re-export main public API
pub use token::{
    AuthStatus, check_token, clear_token, get_auth_status, load_token, prompt_token, save_token,
    setup_token, show_auth_status, verify_token,
};
