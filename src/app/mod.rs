//! Core application logic for the transit catalog client
//!
//! This module contains the main application components: the typed HTTP
//! client, the catalog data models, dataset history utilities, and the
//! supporting-file coordination machinery.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use transit_catalog::app::{CatalogClient, FeedSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(CatalogClient::new()?);
//!
//! // Fetch a GTFS feed and drive its supporting files
//! let feed = client.get_gtfs_feed("mdb-503", None).await?;
//! let session = FeedSession::new(Arc::clone(&client));
//! session.apply_feed(&feed.feed).await;
//!
//! if let Some(dataset) = &feed.latest_dataset {
//!     session.apply_latest_dataset(dataset).await;
//! }
//!
//! let snapshot = session.snapshot().await;
//! println!("feed in view: {:?}", snapshot.context().feed_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod datasets;
pub mod models;
pub mod supporting;

// Re-export main public API
pub use client::{geolocation_url, CatalogClient, ClientConfig};
pub use datasets::{
    fetch_dataset_history, merge_dataset_pages, page_completeness, DatasetRecord, ListCompleteness,
};
pub use models::{
    filter_known_external_ids, BoundingBox, DataType, ExternalId, Feed, GbfsFeed, GtfsDataset,
    GtfsFeed, GtfsRtFeed, License, Location, SearchResults, ValidationReport,
};
pub use supporting::{
    FeedContext, FeedSession, RouteRow, SupportingFileData, SupportingFileKey, SupportingFileState,
    SupportingFiles,
};
