//! Application constants for the transit catalog client
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable name for the catalog API bearer token
    pub const API_TOKEN: &str = "MOBILITY_API_TOKEN";

    /// Environment variable overriding the catalog API base URL
    pub const API_URL: &str = "MOBILITY_API_URL";

    /// Environment variable overriding the derived-files base URL
    pub const FILES_URL: &str = "MOBILITY_FILES_URL";
}

/// Authentication and token storage constants
pub mod auth {
    /// File permissions for .env file (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const ENV_FILE_PERMISSIONS: u32 = 0o600;

    /// Minimum plausible token length, used to catch paste accidents
    pub const MIN_TOKEN_LENGTH: usize = 8;
}

/// Catalog API endpoints
pub mod api {
    /// Default catalog API base URL
    pub const BASE_URL: &str = "https://api.mobilitydatabase.org/v1";

    /// Path segment for the generic feeds collection
    pub const FEEDS_PATH: &str = "feeds";

    /// Path segment for GTFS schedule feeds
    pub const GTFS_FEEDS_PATH: &str = "gtfs_feeds";

    /// Path segment for GTFS realtime feeds
    pub const GTFS_RT_FEEDS_PATH: &str = "gtfs_rt_feeds";

    /// Path segment for GBFS feeds
    pub const GBFS_FEEDS_PATH: &str = "gbfs_feeds";

    /// Path segment for dataset collections under a GTFS feed
    pub const DATASETS_PATH: &str = "datasets";

    /// Path segment for catalog-wide search
    pub const SEARCH_PATH: &str = "search";

    /// Path segment for license lookup
    pub const LICENSES_PATH: &str = "licenses";
}

/// Derived-file hosting constants
pub mod files {
    /// Default base URL for derived files (route extracts, tiles)
    pub const BASE_URL: &str = "https://files.mobilitydatabase.org";

    /// Subpath under `<feed>/<dataset>/` where the routes extract lives
    pub const ROUTES_SUBPATH: &str = "pmtiles/routes.json";

    /// File name replacing the tail of a dataset's hosted URL to reach its
    /// coverage geometry
    pub const GEOLOCATION_FILE: &str = "geolocation.geojson";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "transit-catalog/0.1.0 (Transit Data Browser)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// External-id source registries recognized by the catalog
pub mod sources {
    /// Source tags whose external ids are meaningful to display.
    /// Matching is case-insensitive; entries here are the canonical
    /// lower-case forms.
    pub const KNOWN_EXTERNAL_ID_SOURCES: &[&str] = &["mdb", "tld", "gbfs"];
}

/// Pagination defaults for list and search endpoints
pub mod pagination {
    /// Default page size when the caller does not specify a limit
    pub const DEFAULT_LIMIT: usize = 20;

    /// Page size used when walking a feed's full dataset history
    pub const HISTORY_PAGE_SIZE: usize = 50;

    /// Upper bound on pages fetched by the history walker, so a server
    /// that keeps returning full pages cannot loop us forever
    pub const MAX_HISTORY_PAGES: usize = 100;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use api::BASE_URL as API_BASE_URL;
pub use env::API_TOKEN as ENV_API_TOKEN;
pub use files::BASE_URL as FILES_BASE_URL;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use sources::KNOWN_EXTERNAL_ID_SOURCES;
