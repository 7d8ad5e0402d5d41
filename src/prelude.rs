//! Prelude module for the transit catalog library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use transit_catalog::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use transit_catalog::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // All common types are now available
//!     let client = Arc::new(CatalogClient::new()?);
//!     let session = FeedSession::new(Arc::clone(&client));
//!
//!     let feed = client.get_gtfs_feed("mdb-503", None).await?;
//!     session.apply_feed(&feed.feed).await;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{CatalogError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Catalog access
    CatalogClient,
    ClientConfig,

    // Data types
    BoundingBox,
    DataType,
    Feed,
    GbfsFeed,
    GtfsDataset,
    GtfsFeed,
    GtfsRtFeed,
    SearchResults,

    // Supporting-file coordination
    FeedSession,
    SupportingFileData,
    SupportingFileKey,
    SupportingFileState,
    SupportingFiles,

    // Dataset history utilities (most commonly used)
    fetch_dataset_history,
    merge_dataset_pages,
    page_completeness,
    ListCompleteness,
};

// Authentication functions
pub use crate::auth::{check_token, get_auth_status, load_token, setup_token, AuthStatus};

// Commonly used constants
pub use crate::constants::{API_BASE_URL, ENV_API_TOKEN, FILES_BASE_URL, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::sync::Arc;

// Common external crate re-exports for convenience
// Note: Only re-export types that users will commonly need,
// not the entire crates which would pollute the namespace
pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        // Verify that all essential types are available through prelude
        let _client_config = ClientConfig::default();
        let _files = SupportingFiles::new();

        // Test that auth functions are available
        let _auth_status = get_auth_status();

        // Test that constants are available
        assert_eq!(ENV_API_TOKEN, "MOBILITY_API_TOKEN");
        assert!(USER_AGENT.contains("transit-catalog"));
    }

    #[test]
    fn test_std_reexports() {
        // Arc should be available for shared ownership patterns
        let data = Arc::new(42);
        assert_eq!(*data, 42);
    }
}
