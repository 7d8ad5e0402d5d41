//! Async facade driving supporting-file loads for the feed in view
//!
//! `FeedSession` owns the catalog client and the pure state container and
//! runs the begin/fetch/finish cycle for each supporting file. The state
//! lock is held only for the synchronous transitions, never across a
//! network await: a slow fetch cannot block a context switch, it can only
//! lose the commit it was always going to lose.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use super::state::SupportingFiles;
use super::types::{FeedContext, LoadTicket, SupportingFileData, SupportingFileKey};
use crate::app::client::{geolocation_url, CatalogClient};
use crate::app::models::{Feed, GtfsDataset};

/// Coordinates supporting-file loads for the feed currently in view
#[derive(Debug, Clone)]
pub struct FeedSession {
    client: Arc<CatalogClient>,
    state: Arc<Mutex<SupportingFiles>>,
}

impl FeedSession {
    /// Create a session around a shared catalog client
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SupportingFiles::new())),
        }
    }

    /// Point the session at a feed.
    ///
    /// Entries loaded for any previous feed are cleared before this
    /// returns. Returns whether the context changed.
    pub async fn apply_feed(&self, feed: &Feed) -> bool {
        let mut state = self.state.lock().await;
        state.set_feed(feed.id.clone(), feed.data_type)
    }

    /// Record the feed's latest dataset and, when the change warrants it,
    /// load both supporting files for it concurrently.
    ///
    /// The dataset switch and its load tickets are issued in one state
    /// transition, so the tickets pin the identity the decision was made
    /// for; a context switch landing anywhere after it voids them at
    /// commit time. A dataset without a hosted URL gets no coverage
    /// fetch; one the coverage location cannot be derived from records a
    /// failure without fetching anything.
    pub async fn apply_latest_dataset(&self, dataset: &GtfsDataset) {
        let coverage = coverage_target(dataset);

        let (routes, coverage) = {
            let mut state = self.state.lock().await;
            if !state.set_latest_dataset(dataset.id.clone()) {
                return;
            }
            let Some(feed_id) = state.context().feed_id.clone() else {
                return;
            };

            let routes_url = self.client.routes_file_url(&feed_id, &dataset.id);
            let routes = (state.begin_load(SupportingFileKey::Routes), routes_url);

            let coverage = match coverage {
                CoverageTarget::Fetch(url) => {
                    Some((state.begin_load(SupportingFileKey::CoverageGeojson), url))
                }
                CoverageTarget::Underivable(message) => {
                    let ticket = state.begin_load(SupportingFileKey::CoverageGeojson);
                    state.finish_load(ticket, Err(message));
                    None
                }
                CoverageTarget::Absent => {
                    debug!("Dataset {} has no hosted URL, skipping coverage", dataset.id);
                    None
                }
            };
            (routes, coverage)
        };

        let (routes_ticket, routes_url) = routes;
        futures::join!(self.load_issued(routes_ticket, routes_url), async {
            if let Some((ticket, url)) = coverage {
                self.load_issued(ticket, url).await;
            }
        });
    }

    /// Run the fetch/finish half of a load cycle for a ticket issued
    /// earlier.
    ///
    /// Returns whether the result was committed; a result coming back
    /// after the context moved on is discarded by the state machine.
    async fn load_issued(&self, ticket: LoadTicket, url: Url) -> bool {
        let key = ticket.key();
        let result = self.fetch(key, &url).await;
        if let Err(message) = &result {
            warn!("Loading {} from {} failed: {}", key, url, message);
        }

        self.finish_load(ticket, result).await
    }

    /// Fetch and parse the payload a key calls for.
    ///
    /// Errors are flattened to their display form here; the state machine
    /// stores messages, not error values.
    async fn fetch(&self, key: SupportingFileKey, url: &Url) -> Result<SupportingFileData, String> {
        match key {
            SupportingFileKey::Routes => self
                .client
                .get_routes_file(url)
                .await
                .map(SupportingFileData::Routes)
                .map_err(|error| error.to_string()),
            SupportingFileKey::CoverageGeojson => self
                .client
                .get_coverage_geometry(url)
                .await
                .map(SupportingFileData::Coverage)
                .map_err(|error| error.to_string()),
        }
    }

    /// Begin a load explicitly and receive its ticket.
    ///
    /// With [`finish_load`](Self::finish_load) this is the seam for
    /// callers that produce a payload some other way than the client
    /// fetches.
    pub async fn begin_load(&self, key: SupportingFileKey) -> LoadTicket {
        let mut state = self.state.lock().await;
        state.begin_load(key)
    }

    /// Commit an explicitly begun load. Returns whether the result was
    /// committed rather than dropped as stale.
    pub async fn finish_load(
        &self,
        ticket: LoadTicket,
        result: Result<SupportingFileData, String>,
    ) -> bool {
        let mut state = self.state.lock().await;
        let committed = state.finish_load(ticket, result);
        if !committed {
            debug!("Supporting-file result arrived after a context switch, dropped");
        }
        committed
    }

    /// Clone of the current state for rendering
    pub async fn snapshot(&self) -> SupportingFiles {
        self.state.lock().await.clone()
    }

    /// Snapshot of the current context
    pub async fn context(&self) -> FeedContext {
        self.state.lock().await.context().clone()
    }

    /// Clear everything, context included
    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }
}

/// Where a dataset's coverage geometry can be fetched from, if anywhere
enum CoverageTarget {
    /// No hosted URL to derive from; the entry stays untouched
    Absent,
    /// Hosted URL present but no coverage location derivable from it
    Underivable(String),
    /// Derived coverage geometry URL
    Fetch(Url),
}

fn coverage_target(dataset: &GtfsDataset) -> CoverageTarget {
    match dataset.hosted_url.as_deref() {
        None => CoverageTarget::Absent,
        Some(hosted_url) => match geolocation_url(hosted_url) {
            Ok(url) => CoverageTarget::Fetch(url),
            Err(error) => CoverageTarget::Underivable(error.to_string()),
        },
    }
}
