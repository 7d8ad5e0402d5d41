//! HTTP client implementation for the transit catalog API
//!
//! This module provides a typed client over the catalog's REST endpoints and
//! the derived-file host. It is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: core request operations and error-status handling
//!
//! Every method takes the bearer token as an argument, so the credential is
//! scoped to that single request; the client itself holds no auth state and
//! can be shared freely across tasks.

use geojson::GeoJson;
use url::Url;

use crate::app::models::{
    DataType, Feed, GbfsFeed, GtfsDataset, GtfsFeed, GtfsRtFeed, License, SearchResults,
};
use crate::app::supporting::RouteRow;
use crate::constants::{api, files};
use crate::errors::{ApiError, ApiResult};

// Module declarations
pub mod config;
pub mod http;

// Re-export public types for convenience
pub use config::ClientConfig;

use http::HttpHandler;

/// Typed client for the transit catalog API and its derived-file host
#[derive(Debug)]
pub struct CatalogClient {
    http: HttpHandler,
    base_url: Url,
    files_base_url: Url,
}

impl CatalogClient {
    /// Creates a client against the public catalog with default settings
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if HTTP client creation fails
    pub fn new() -> ApiResult<Self> {
        Self::with_config(api::BASE_URL, files::BASE_URL, ClientConfig::default())
    }

    /// Creates a client against custom base URLs
    ///
    /// # Arguments
    ///
    /// * `api_base` - Catalog API base URL, including the version prefix
    /// * `files_base` - Derived-file host base URL
    /// * `config` - Client configuration settings
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if either base URL does not parse or HTTP client
    /// creation fails
    pub fn with_config(api_base: &str, files_base: &str, config: ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(api_base)?;
        let files_base_url = Url::parse(files_base)?;
        let client = config.build_http_client()?;

        tracing::debug!("Created catalog client for {}", base_url);

        Ok(Self {
            http: HttpHandler::new(client),
            base_url,
            files_base_url,
        })
    }

    /// Fetches a feed of any data type by its catalog id
    ///
    /// # Arguments
    ///
    /// * `feed_id` - Catalog feed identifier (e.g., "mdb-503")
    /// * `token` - Optional bearer token for this request
    pub async fn get_feed(&self, feed_id: &str, token: Option<&str>) -> ApiResult<Feed> {
        let url = self.endpoint(&[api::FEEDS_PATH, feed_id]);
        self.http.get_json(&url, token).await
    }

    /// Fetches a GTFS schedule feed, including its latest dataset summary
    pub async fn get_gtfs_feed(&self, feed_id: &str, token: Option<&str>) -> ApiResult<GtfsFeed> {
        let url = self.endpoint(&[api::GTFS_FEEDS_PATH, feed_id]);
        self.http.get_json(&url, token).await
    }

    /// Fetches a GTFS realtime feed
    pub async fn get_gtfs_rt_feed(
        &self,
        feed_id: &str,
        token: Option<&str>,
    ) -> ApiResult<GtfsRtFeed> {
        let url = self.endpoint(&[api::GTFS_RT_FEEDS_PATH, feed_id]);
        self.http.get_json(&url, token).await
    }

    /// Fetches a GBFS feed with its published versions
    pub async fn get_gbfs_feed(&self, feed_id: &str, token: Option<&str>) -> ApiResult<GbfsFeed> {
        let url = self.endpoint(&[api::GBFS_FEEDS_PATH, feed_id]);
        self.http.get_json(&url, token).await
    }

    /// Lists catalog feeds across all data types
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size; the server default applies when absent
    /// * `offset` - Zero-based offset into the collection
    /// * `token` - Optional bearer token for this request
    pub async fn list_feeds(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
        token: Option<&str>,
    ) -> ApiResult<Vec<Feed>> {
        let mut url = self.endpoint(&[api::FEEDS_PATH]);
        Self::apply_paging(&mut url, limit, offset);
        self.http.get_json(&url, token).await
    }

    /// Lists one page of a GTFS feed's dataset history
    ///
    /// Pages are raw: combining them and keeping the newest-first order is
    /// the caller's job, see [`merge_dataset_pages`](crate::app::datasets::merge_dataset_pages).
    ///
    /// # Arguments
    ///
    /// * `feed_id` - Catalog feed identifier
    /// * `limit` - Page size; the server default applies when absent
    /// * `offset` - Zero-based offset into the history
    /// * `token` - Optional bearer token for this request
    pub async fn list_gtfs_datasets(
        &self,
        feed_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        token: Option<&str>,
    ) -> ApiResult<Vec<GtfsDataset>> {
        let mut url = self.endpoint(&[api::GTFS_FEEDS_PATH, feed_id, api::DATASETS_PATH]);
        Self::apply_paging(&mut url, limit, offset);
        self.http.get_json(&url, token).await
    }

    /// Resolves a GTFS feed's most recent dataset, when one exists
    pub async fn get_latest_dataset(
        &self,
        feed_id: &str,
        token: Option<&str>,
    ) -> ApiResult<Option<GtfsDataset>> {
        let mut url = self.endpoint(&[api::GTFS_FEEDS_PATH, feed_id, api::DATASETS_PATH]);
        url.query_pairs_mut().append_pair("latest", "true");
        let datasets: Vec<GtfsDataset> = self.http.get_json(&url, token).await?;
        Ok(datasets.into_iter().next())
    }

    /// Fetches one GTFS dataset by its catalog id
    pub async fn get_gtfs_dataset(
        &self,
        dataset_id: &str,
        token: Option<&str>,
    ) -> ApiResult<GtfsDataset> {
        let url = self.endpoint(&[
            api::DATASETS_PATH,
            DataType::Gtfs.api_value(),
            dataset_id,
        ]);
        self.http.get_json(&url, token).await
    }

    /// Searches the catalog
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text query, sent as `search_query`
    /// * `limit` - Page size; the server default applies when absent
    /// * `offset` - Zero-based offset into the result set
    /// * `data_type` - Restrict hits to one data type
    /// * `token` - Optional bearer token for this request
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        data_type: Option<DataType>,
        token: Option<&str>,
    ) -> ApiResult<SearchResults> {
        let mut url = self.endpoint(&[api::SEARCH_PATH]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("search_query", query);
            if let Some(data_type) = data_type {
                pairs.append_pair("data_type", data_type.api_value());
            }
        }
        Self::apply_paging(&mut url, limit, offset);
        self.http.get_json(&url, token).await
    }

    /// Looks up license metadata by SPDX identifier
    pub async fn get_license(&self, license_id: &str, token: Option<&str>) -> ApiResult<License> {
        let url = self.endpoint(&[api::LICENSES_PATH, license_id]);
        self.http.get_json(&url, token).await
    }

    /// Fetches a dataset's route listing extract from the file host
    pub async fn get_routes_file(&self, url: &Url) -> ApiResult<Vec<RouteRow>> {
        self.http.get_json(url, None).await
    }

    /// Fetches and parses a coverage geometry document
    ///
    /// The file host serves GeoJSON under a generic content type, so the
    /// body is fetched as text and parsed explicitly.
    pub async fn get_coverage_geometry(&self, url: &Url) -> ApiResult<GeoJson> {
        let text = self.http.get_text(url, None).await?;
        text.parse::<GeoJson>()
            .map_err(|error| ApiError::UnexpectedPayload {
                reason: format!("invalid GeoJSON from {}: {}", url, error),
            })
    }

    /// Builds the URL of a dataset's route listing extract:
    /// `<files-base>/<feed>/<dataset>/pmtiles/routes.json`
    pub fn routes_file_url(&self, feed_id: &str, dataset_id: &str) -> Url {
        let mut url = self.files_base_url.clone();
        url.path_segments_mut()
            .expect("HTTP(S) URLs always have path segments")
            .pop_if_empty()
            .extend([feed_id, dataset_id])
            .extend(files::ROUTES_SUBPATH.split('/'));
        url
    }

    /// Get the catalog API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the derived-file host base URL
    pub fn files_base_url(&self) -> &Url {
        &self.files_base_url
    }

    /// Builds an endpoint URL under the API base
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("HTTP(S) URLs always have path segments")
            .pop_if_empty()
            .extend(segments);
        url
    }

    /// Appends limit/offset query parameters, omitting absent ones entirely
    fn apply_paging(url: &mut Url, limit: Option<usize>, offset: Option<usize>) {
        if limit.is_none() && offset.is_none() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if let Some(limit) = limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = offset {
            pairs.append_pair("offset", &offset.to_string());
        }
    }
}

/// Derives the coverage geometry URL from a dataset's hosted URL by
/// replacing its last two path segments with `geolocation.geojson`.
///
/// A dataset hosted at `<base>/<feed>/<dataset>/<file>.zip` keeps its
/// coverage document at `<base>/<feed>/geolocation.geojson`.
///
/// # Errors
///
/// Returns `ApiError::UnderivableUrl` when the hosted URL has fewer than
/// two path segments, and `ApiError::Url` when it does not parse at all
pub fn geolocation_url(hosted_url: &str) -> ApiResult<Url> {
    let mut url = Url::parse(hosted_url)?;
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(String::from).collect())
        .unwrap_or_default();

    if segments.len() < 2 {
        return Err(ApiError::UnderivableUrl {
            file: files::GEOLOCATION_FILE.to_string(),
            url: hosted_url.to_string(),
        });
    }

    {
        let mut path = url
            .path_segments_mut()
            .expect("URL verified above to carry path segments");
        path.clear();
        path.extend(&segments[..segments.len() - 2]);
        path.push(files::GEOLOCATION_FILE);
    }
    Ok(url)
}
