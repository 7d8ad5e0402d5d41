//! Core data structures for supporting-file coordination
//!
//! This module defines the types that track the map-adjacent files a feed
//! view carries: which feed and dataset the view is on, the load state of
//! each supporting file, and the ticket that ties an in-flight fetch back
//! to the context it was started under.

use geojson::GeoJson;
use serde::{Deserialize, Serialize};

use crate::app::models::DataType;

/// The supporting files tracked per feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportingFileKey {
    /// Coverage geometry derived from the latest dataset's hosted URL
    CoverageGeojson,
    /// Route listing extract of the latest dataset
    Routes,
}

impl SupportingFileKey {
    /// All keys, in display order
    pub const ALL: [SupportingFileKey; 2] = [Self::CoverageGeojson, Self::Routes];

    /// Short name for logs and display
    pub fn name(&self) -> &'static str {
        match self {
            Self::CoverageGeojson => "coverage",
            Self::Routes => "routes",
        }
    }
}

impl std::fmt::Display for SupportingFileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// GTFS route type, which the extract pipeline has emitted both as a
/// numeric code and as a name over its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTypeValue {
    /// Numeric GTFS route type code
    Code(i64),
    /// Named route type
    Name(String),
}

impl std::fmt::Display for RouteTypeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteTypeValue::Code(code) => write!(f, "{}", code),
            RouteTypeValue::Name(name) => write!(f, "{}", name),
        }
    }
}

/// One row of a dataset's route listing extract.
///
/// The extract is produced by a separate pipeline whose field casing has
/// drifted over time; both snake_case and camelCase spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    /// GTFS route id
    #[serde(alias = "routeId")]
    pub route_id: Option<String>,
    /// Display name of the route
    #[serde(alias = "routeName")]
    pub route_name: Option<String>,
    /// GTFS route type
    #[serde(alias = "routeType")]
    pub route_type: Option<RouteTypeValue>,
    /// Route color as a hex string, without the leading '#'
    #[serde(alias = "routeColor")]
    pub route_color: Option<String>,
}

/// Payload of a successfully loaded supporting file
#[derive(Debug, Clone, PartialEq)]
pub enum SupportingFileData {
    /// Parsed coverage geometry
    Coverage(GeoJson),
    /// Parsed route listing
    Routes(Vec<RouteRow>),
}

impl SupportingFileData {
    /// The key this payload belongs under
    pub fn key(&self) -> SupportingFileKey {
        match self {
            Self::Coverage(_) => SupportingFileKey::CoverageGeojson,
            Self::Routes(_) => SupportingFileKey::Routes,
        }
    }
}

/// Load state of one supporting file
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SupportingFileState {
    /// Nothing requested yet for the current context
    #[default]
    Uninitialized,
    /// A fetch is in flight
    Loading,
    /// The last fetch for the current context succeeded
    Loaded(SupportingFileData),
    /// The last fetch for the current context failed
    Failed { message: String },
}

impl SupportingFileState {
    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if a payload is available
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Check if the last fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The payload, when loaded
    pub fn data(&self) -> Option<&SupportingFileData> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// The failure message, when failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Which feed and dataset the view is currently on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedContext {
    /// Feed the supporting files belong to
    pub feed_id: Option<String>,
    /// Dataset the supporting files derive from
    pub dataset_id: Option<String>,
    /// Data type of the feed, kept for callers deciding which files apply
    pub data_type: Option<DataType>,
}

impl FeedContext {
    /// Whether two contexts refer to the same feed and dataset.
    ///
    /// Data type is display metadata and does not participate: a result is
    /// stale exactly when the (feed, dataset) pair has moved on.
    pub fn same_identity(&self, other: &FeedContext) -> bool {
        self.feed_id == other.feed_id && self.dataset_id == other.dataset_id
    }
}

/// Proof of which context a load was started under.
///
/// Issued by `begin_load` and consumed by `finish_load`, which compares
/// the snapshot against the then-current context and discards results
/// arriving late for a context the view has already left.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub(crate) key: SupportingFileKey,
    pub(crate) context: FeedContext,
}

impl LoadTicket {
    /// The supporting file this ticket was issued for
    pub fn key(&self) -> SupportingFileKey {
        self.key
    }
}
