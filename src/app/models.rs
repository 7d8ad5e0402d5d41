//! Data models for the transit catalog
//!
//! This module defines the payload structures returned by the catalog API,
//! including feeds of every data type, dataset metadata, and search results.
//! The catalog evolves ahead of its clients, so every nested field is
//! optional: an absent field is normal data, never a deserialization failure.
//! Only entity identifiers are required.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::sources;

/// Data type of a catalog feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// GTFS schedule feed
    Gtfs,
    /// GTFS realtime feed
    GtfsRt,
    /// GBFS shared-mobility feed
    Gbfs,
    /// Tag not recognized by this client version
    #[serde(other)]
    Unknown,
}

impl DataType {
    /// Convert from the API's tag format (e.g., "gtfs_rt")
    pub fn from_api_value(value: &str) -> Option<Self> {
        match value {
            "gtfs" => Some(Self::Gtfs),
            "gtfs_rt" => Some(Self::GtfsRt),
            "gbfs" => Some(Self::Gbfs),
            _ => None,
        }
    }

    /// Get the API's tag format (e.g., "gtfs_rt")
    pub fn api_value(&self) -> &'static str {
        match self {
            Self::Gtfs => "gtfs",
            Self::GtfsRt => "gtfs_rt",
            Self::Gbfs => "gbfs",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gtfs => "GTFS Schedule",
            Self::GtfsRt => "GTFS Realtime",
            Self::Gbfs => "GBFS",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_value())
    }
}

/// Geographic location attached to a feed or search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// ISO country code (e.g., "US")
    pub country_code: Option<String>,
    /// Country display name
    pub country: Option<String>,
    /// State, province, or region name
    pub subdivision_name: Option<String>,
    /// City or municipality name
    pub municipality: Option<String>,
}

impl Location {
    /// One-line description from the most specific fields present,
    /// or `None` when the location carries no usable names
    pub fn describe(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.municipality.as_deref(),
            self.subdivision_name.as_deref(),
            self.country
                .as_deref()
                .or(self.country_code.as_deref()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Upstream source details for a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceInfo {
    /// URL the producer publishes the feed at
    pub producer_url: Option<String>,
    /// Authentication scheme required by the producer (0 = none)
    pub authentication_type: Option<u8>,
    /// Where to learn about obtaining credentials
    pub authentication_info_url: Option<String>,
    /// Query parameter name carrying the API key, when applicable
    pub api_key_parameter_name: Option<String>,
    /// License covering the feed contents
    pub license_url: Option<String>,
}

/// Redirect from a deprecated feed to its replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Identifier of the feed to use instead
    pub target_id: Option<String>,
    /// Operator-supplied explanation
    pub comment: Option<String>,
}

/// Identifier for this feed in an external registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalId {
    /// The identifier in the external registry
    pub external_id: Option<String>,
    /// Registry the identifier belongs to (e.g., "mdb")
    pub source: Option<String>,
}

/// Catalog feed, common fields shared by every data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Stable catalog identifier (e.g., "mdb-503")
    pub id: String,
    /// Data type tag
    pub data_type: Option<DataType>,
    /// Lifecycle status (e.g., "active", "deprecated")
    pub status: Option<String>,
    /// Provider display string, possibly comma-separated
    pub provider: Option<String>,
    /// Operator-facing feed name
    pub feed_name: Option<String>,
    /// Free-form catalog note
    pub note: Option<String>,
    /// Whether the feed is published by the operating agency itself
    pub official: Option<bool>,
    /// Upstream source details
    pub source_info: Option<SourceInfo>,
    /// Redirects to replacement feeds
    #[serde(default)]
    pub redirects: Vec<Redirect>,
    /// Identifiers in external registries
    #[serde(default)]
    pub external_ids: Vec<ExternalId>,
    /// Geographic coverage
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Feed {
    /// Split the comma-separated provider string into individual names,
    /// trimmed and ordered case-insensitively. Empty segments are dropped.
    pub fn sorted_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = self
            .provider
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        providers.sort_by_key(|name| name.to_lowercase());
        providers
    }
}

/// GTFS schedule feed with its most recent dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtfsFeed {
    #[serde(flatten)]
    pub feed: Feed,
    /// Most recently ingested dataset, when one exists
    pub latest_dataset: Option<GtfsDataset>,
}

/// GTFS realtime feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtfsRtFeed {
    #[serde(flatten)]
    pub feed: Feed,
    /// Realtime entity types served (e.g., "vu" for vehicle positions)
    #[serde(default)]
    pub entity_types: Vec<String>,
    /// Identifiers of the schedule feeds this realtime feed annotates
    #[serde(default)]
    pub feed_references: Vec<String>,
}

/// GBFS shared-mobility feed with its published versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbfsFeed {
    #[serde(flatten)]
    pub feed: Feed,
    /// Published GBFS versions
    #[serde(default)]
    pub versions: Vec<GbfsVersion>,
}

/// One published version of a GBFS feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbfsVersion {
    /// GBFS specification version (e.g., "2.3")
    pub version: Option<String>,
    /// How the version was registered (e.g., "autodiscovery")
    pub source: Option<String>,
    /// Auto-discovery URL for this version
    pub auto_discovery_url: Option<String>,
    /// Most recent validation of this version
    pub latest_validation_report: Option<GbfsValidationReport>,
}

/// Validation summary for a GBFS version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbfsValidationReport {
    /// When the validator ran
    pub validated_at: Option<DateTime<Utc>>,
    /// Validator release used
    pub validator_version: Option<String>,
    /// Total error count across all files
    pub total_errors_count: Option<u64>,
    /// Where the full report is published
    pub report_summary_url: Option<String>,
}

/// One ingested dataset of a GTFS schedule feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtfsDataset {
    /// Stable dataset identifier (e.g., "mdb-503-202402121801")
    pub id: String,
    /// Feed the dataset belongs to
    pub feed_id: Option<String>,
    /// Where the catalog hosts the dataset zip
    pub hosted_url: Option<String>,
    /// Free-form catalog note
    pub note: Option<String>,
    /// When the catalog downloaded the dataset from the producer
    pub downloaded_at: Option<DateTime<Utc>>,
    /// Content hash of the dataset zip
    pub hash: Option<String>,
    /// Geographic extent of the dataset's stops
    pub bounding_box: Option<BoundingBox>,
    /// Canonical validator results
    pub validation_report: Option<ValidationReport>,
    /// First service date covered
    pub service_date_range_start: Option<NaiveDate>,
    /// Last service date covered
    pub service_date_range_end: Option<NaiveDate>,
}

/// Canonical validator results for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// When the validator ran
    pub validated_at: Option<DateTime<Utc>>,
    /// Validator release used
    pub validator_version: Option<String>,
    /// GTFS features detected in the dataset
    #[serde(default)]
    pub features: Vec<String>,
    /// Total error notices
    pub total_error: Option<u64>,
    /// Total warning notices
    pub total_warning: Option<u64>,
    /// Total info notices
    pub total_info: Option<u64>,
    /// Distinct error codes
    pub unique_error_count: Option<u64>,
    /// Distinct warning codes
    pub unique_warning_count: Option<u64>,
    /// Distinct info codes
    pub unique_info_count: Option<u64>,
    /// Machine-readable report location
    pub url_json: Option<String>,
    /// Human-readable report location
    pub url_html: Option<String>,
}

/// Geographic extent of a dataset, axis-aligned
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    /// Southern edge
    pub minimum_latitude: Option<f64>,
    /// Northern edge
    pub maximum_latitude: Option<f64>,
    /// Western edge
    pub minimum_longitude: Option<f64>,
    /// Eastern edge
    pub maximum_longitude: Option<f64>,
}

impl BoundingBox {
    /// Build the four-corner polygon `[[minLat, minLon], [minLat, maxLon],
    /// [maxLat, maxLon], [maxLat, minLon]]` for map display.
    ///
    /// Returns `None` when any extreme is absent: a partial box is
    /// undefined, never a degenerate shape.
    pub fn to_polygon(&self) -> Option<[[f64; 2]; 4]> {
        let min_lat = self.minimum_latitude?;
        let max_lat = self.maximum_latitude?;
        let min_lon = self.minimum_longitude?;
        let max_lon = self.maximum_longitude?;

        Some([
            [min_lat, min_lon],
            [min_lat, max_lon],
            [max_lat, max_lon],
            [max_lat, min_lon],
        ])
    }
}

/// Catalog-wide search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Server-side total across all pages
    pub total: Option<u64>,
    /// Results for the requested page
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Stable catalog identifier
    pub id: String,
    /// Data type tag
    pub data_type: Option<DataType>,
    /// Lifecycle status
    pub status: Option<String>,
    /// Provider display string
    pub provider: Option<String>,
    /// Operator-facing feed name
    pub feed_name: Option<String>,
    /// Geographic coverage
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// License metadata, looked up by SPDX identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// SPDX identifier (e.g., "CC-BY-4.0")
    pub id: String,
    /// Full license name
    pub name: Option<String>,
    /// Canonical license text location
    pub url: Option<String>,
}

/// Keep only external ids worth displaying: the source must be a known
/// registry (matched case-insensitively) and the id itself must be present.
/// Original casing of both fields is preserved in the output.
pub fn filter_known_external_ids(ids: &[ExternalId]) -> Vec<ExternalId> {
    ids.iter()
        .filter(|entry| {
            let known_source = entry
                .source
                .as_deref()
                .map(|source| {
                    sources::KNOWN_EXTERNAL_ID_SOURCES.contains(&source.to_lowercase().as_str())
                })
                .unwrap_or(false);
            known_source && entry.external_id.is_some()
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external_id(id: Option<&str>, source: Option<&str>) -> ExternalId {
        ExternalId {
            external_id: id.map(String::from),
            source: source.map(String::from),
        }
    }

    #[test]
    fn test_data_type_api_values() {
        assert_eq!(DataType::from_api_value("gtfs"), Some(DataType::Gtfs));
        assert_eq!(DataType::from_api_value("gtfs_rt"), Some(DataType::GtfsRt));
        assert_eq!(DataType::from_api_value("gbfs"), Some(DataType::Gbfs));
        assert_eq!(DataType::from_api_value("atco"), None);

        assert_eq!(DataType::GtfsRt.api_value(), "gtfs_rt");
        assert_eq!(format!("{}", DataType::Gbfs), "gbfs");
        assert_eq!(DataType::Gtfs.label(), "GTFS Schedule");
    }

    #[test]
    fn test_data_type_unknown_tag_tolerated() {
        // A tag added to the API after this client shipped must not fail
        // the whole payload
        let parsed: DataType = serde_json::from_str("\"gtfs_flex\"").unwrap();
        assert_eq!(parsed, DataType::Unknown);

        let parsed: DataType = serde_json::from_str("\"gtfs_rt\"").unwrap();
        assert_eq!(parsed, DataType::GtfsRt);
    }

    #[test]
    fn test_sparse_feed_deserializes() {
        // Identifier only; everything else absent
        let feed: Feed = serde_json::from_str(r#"{"id": "mdb-1"}"#).unwrap();
        assert_eq!(feed.id, "mdb-1");
        assert_eq!(feed.data_type, None);
        assert!(feed.external_ids.is_empty());
        assert!(feed.locations.is_empty());
        assert_eq!(feed.sorted_providers(), Vec::<String>::new());
    }

    #[test]
    fn test_full_feed_deserializes() {
        let payload = r#"{
            "id": "mdb-503",
            "data_type": "gtfs",
            "status": "active",
            "provider": "MBTA",
            "feed_name": "Fixed Route",
            "official": true,
            "source_info": {
                "producer_url": "https://cdn.mbta.com/MBTA_GTFS.zip",
                "authentication_type": 0,
                "license_url": "https://www.mbta.com/developers/v3-api"
            },
            "external_ids": [{"external_id": "503", "source": "mdb"}],
            "locations": [{
                "country_code": "US",
                "country": "United States",
                "subdivision_name": "Massachusetts",
                "municipality": "Boston"
            }]
        }"#;
        let feed: Feed = serde_json::from_str(payload).unwrap();
        assert_eq!(feed.data_type, Some(DataType::Gtfs));
        assert_eq!(
            feed.source_info.unwrap().producer_url.as_deref(),
            Some("https://cdn.mbta.com/MBTA_GTFS.zip")
        );
        assert_eq!(
            feed.locations[0].describe().as_deref(),
            Some("Boston, Massachusetts, United States")
        );
    }

    #[test]
    fn test_sorted_providers_ordering() {
        let feed = Feed {
            provider: Some("Zenith Transit, acme bus ,  Metro North,".to_string()),
            ..sparse_feed("mdb-9")
        };
        assert_eq!(
            feed.sorted_providers(),
            vec!["acme bus", "Metro North", "Zenith Transit"]
        );
    }

    fn sparse_feed(id: &str) -> Feed {
        serde_json::from_value(serde_json::json!({ "id": id })).unwrap()
    }

    #[test]
    fn test_location_describe_partial() {
        let location = Location {
            country_code: Some("FR".to_string()),
            country: None,
            subdivision_name: None,
            municipality: None,
        };
        assert_eq!(location.describe().as_deref(), Some("FR"));

        let empty = Location {
            country_code: None,
            country: None,
            subdivision_name: None,
            municipality: None,
        };
        assert_eq!(empty.describe(), None);
    }

    #[test]
    fn test_gtfs_feed_flattens_common_fields() {
        let payload = r#"{
            "id": "mdb-503",
            "data_type": "gtfs",
            "latest_dataset": {
                "id": "mdb-503-202402121801",
                "downloaded_at": "2024-02-12T18:01:00Z",
                "hosted_url": "https://files.example.org/mdb-503/mdb-503-202402121801/mdb-503-202402121801.zip"
            }
        }"#;
        let feed: GtfsFeed = serde_json::from_str(payload).unwrap();
        assert_eq!(feed.feed.id, "mdb-503");
        let dataset = feed.latest_dataset.unwrap();
        assert_eq!(dataset.id, "mdb-503-202402121801");
        assert!(dataset.downloaded_at.is_some());
    }

    #[test]
    fn test_gbfs_feed_versions_default_empty() {
        let feed: GbfsFeed = serde_json::from_str(r#"{"id": "gbfs-bluebikes"}"#).unwrap();
        assert!(feed.versions.is_empty());
    }

    #[test]
    fn test_polygon_from_complete_box() {
        let bbox = BoundingBox {
            minimum_latitude: Some(1.0),
            maximum_latitude: Some(3.0),
            minimum_longitude: Some(2.0),
            maximum_longitude: Some(4.0),
        };
        assert_eq!(
            bbox.to_polygon(),
            Some([[1.0, 2.0], [1.0, 4.0], [3.0, 4.0], [3.0, 2.0]])
        );
    }

    #[test]
    fn test_polygon_requires_all_extremes() {
        let complete = BoundingBox {
            minimum_latitude: Some(1.0),
            maximum_latitude: Some(3.0),
            minimum_longitude: Some(2.0),
            maximum_longitude: Some(4.0),
        };

        // Dropping any one extreme leaves the polygon undefined
        for missing in 0..4 {
            let mut bbox = complete;
            match missing {
                0 => bbox.minimum_latitude = None,
                1 => bbox.maximum_latitude = None,
                2 => bbox.minimum_longitude = None,
                _ => bbox.maximum_longitude = None,
            }
            assert_eq!(bbox.to_polygon(), None);
        }

        assert_eq!(BoundingBox::default().to_polygon(), None);
    }

    #[test]
    fn test_external_id_filtering() {
        let ids = vec![
            external_id(Some("503"), Some("mdb")),
            external_id(Some("gb-1"), Some("GBFS")),
            external_id(Some("x-9"), Some("onestop")),
            external_id(None, Some("tld")),
            external_id(Some("orphan"), None),
        ];

        let kept = filter_known_external_ids(&ids);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].external_id.as_deref(), Some("503"));
        // Source casing survives the case-insensitive match
        assert_eq!(kept[1].source.as_deref(), Some("GBFS"));
    }

    #[test]
    fn test_search_results_deserialize() {
        let payload = r#"{
            "total": 120,
            "results": [
                {"id": "mdb-503", "data_type": "gtfs", "provider": "MBTA"},
                {"id": "mdb-1585", "data_type": "gtfs_rt"}
            ]
        }"#;
        let results: SearchResults = serde_json::from_str(payload).unwrap();
        assert_eq!(results.total, Some(120));
        assert_eq!(results.results.len(), 2);
        assert_eq!(results.results[1].data_type, Some(DataType::GtfsRt));
    }

    #[test]
    fn test_dataset_service_dates_parse() {
        let payload = r#"{
            "id": "mdb-503-202402121801",
            "service_date_range_start": "2024-02-01",
            "service_date_range_end": "2024-06-15"
        }"#;
        let dataset: GtfsDataset = serde_json::from_str(payload).unwrap();
        assert_eq!(
            dataset.service_date_range_start,
            Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );
        assert!(dataset.bounding_box.is_none());
    }
}
