//! Pure state container for supporting-file coordination
//!
//! This module holds the synchronous state transitions; all I/O lives with
//! the caller. The stale-response rule is enforced here: a result can only
//! be committed with the ticket its load was begun under, and the ticket is
//! void once the context identity has moved on. Clearing on context change
//! plus the commit-time check together guarantee a payload is never
//! observable next to a context it does not belong to.

use std::collections::HashMap;

use tracing::debug;

use super::types::{
    FeedContext, LoadTicket, SupportingFileData, SupportingFileKey, SupportingFileState,
};
use crate::app::models::DataType;

/// Supporting-file state for the feed currently in view
#[derive(Debug, Clone, Default)]
pub struct SupportingFiles {
    /// Context the entries belong to
    context: FeedContext,
    /// Load state per supporting file; absent means uninitialized
    entries: HashMap<SupportingFileKey, SupportingFileState>,
}

impl SupportingFiles {
    /// Create an empty state with no context
    pub fn new() -> Self {
        Self::default()
    }

    /// Current context
    pub fn context(&self) -> &FeedContext {
        &self.context
    }

    /// Load state of one supporting file
    pub fn state(&self, key: SupportingFileKey) -> &SupportingFileState {
        self.entries
            .get(&key)
            .unwrap_or(&SupportingFileState::Uninitialized)
    }

    /// Check if a fetch is in flight for a key
    pub fn is_loading(&self, key: SupportingFileKey) -> bool {
        self.state(key).is_loading()
    }

    /// Point the state at a feed.
    ///
    /// A different feed id replaces the context (the dataset becomes
    /// unknown again) and clears every entry, so nothing loaded for the
    /// previous feed survives into the new one. The same feed id is a
    /// no-op. Returns whether the context changed.
    pub fn set_feed(&mut self, feed_id: impl Into<String>, data_type: Option<DataType>) -> bool {
        let feed_id = feed_id.into();
        if self.context.feed_id.as_deref() == Some(feed_id.as_str()) {
            return false;
        }

        debug!("Supporting-file context moved to feed {}", feed_id);
        self.context = FeedContext {
            feed_id: Some(feed_id),
            dataset_id: None,
            data_type,
        };
        self.entries.clear();
        true
    }

    /// Record which dataset the supporting files derive from.
    ///
    /// A different dataset id clears the entries; the same id is a no-op.
    /// Returns whether a routes fetch is now warranted, which requires the
    /// dataset to have changed under a known feed.
    pub fn set_latest_dataset(&mut self, dataset_id: impl Into<String>) -> bool {
        let dataset_id = dataset_id.into();
        if self.context.dataset_id.as_deref() == Some(dataset_id.as_str()) {
            return false;
        }

        debug!("Supporting-file context moved to dataset {}", dataset_id);
        self.context.dataset_id = Some(dataset_id);
        self.entries.clear();
        self.context.feed_id.is_some()
    }

    /// Begin a load: the entry becomes `Loading` and the returned ticket
    /// pins the context the fetch belongs to
    pub fn begin_load(&mut self, key: SupportingFileKey) -> LoadTicket {
        self.entries.insert(key, SupportingFileState::Loading);
        debug!("Loading {} for {:?}", key, self.context.feed_id);
        LoadTicket {
            key,
            context: self.context.clone(),
        }
    }

    /// Commit a finished load.
    ///
    /// When the ticket's context snapshot no longer matches the current
    /// identity, the result is stale: it is dropped without touching any
    /// entry and `false` is returned. In-flight fetches are never aborted;
    /// this is where their late results die.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SupportingFileData, String>,
    ) -> bool {
        if !ticket.context.same_identity(&self.context) {
            debug!(
                "Dropped stale {} result started under feed {:?}, view is on {:?}",
                ticket.key, ticket.context.feed_id, self.context.feed_id
            );
            return false;
        }

        let next = match result {
            Ok(data) => SupportingFileState::Loaded(data),
            Err(message) => SupportingFileState::Failed { message },
        };
        self.entries.insert(ticket.key, next);
        true
    }

    /// Drop everything, context included
    pub fn reset(&mut self) {
        debug!("Supporting-file state reset");
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes_payload() -> SupportingFileData {
        SupportingFileData::Routes(vec![])
    }

    #[test]
    fn test_initial_state() {
        let state = SupportingFiles::new();
        assert_eq!(state.context().feed_id, None);
        assert_eq!(state.context().dataset_id, None);
        for key in SupportingFileKey::ALL {
            assert_eq!(state.state(key), &SupportingFileState::Uninitialized);
        }
    }

    #[test]
    fn test_set_feed_clears_previous_entries() {
        let mut state = SupportingFiles::new();
        assert!(state.set_feed("mdb-503", Some(DataType::Gtfs)));
        state.set_latest_dataset("mdb-503-2024");

        let ticket = state.begin_load(SupportingFileKey::Routes);
        assert!(state.finish_load(ticket, Ok(routes_payload())));
        assert!(state.state(SupportingFileKey::Routes).is_loaded());

        // A new feed starts from a clean slate, dataset included
        assert!(state.set_feed("mdb-504", Some(DataType::Gtfs)));
        assert_eq!(state.context().feed_id.as_deref(), Some("mdb-504"));
        assert_eq!(state.context().dataset_id, None);
        assert_eq!(
            state.state(SupportingFileKey::Routes),
            &SupportingFileState::Uninitialized
        );
    }

    #[test]
    fn test_set_feed_same_id_is_noop() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        state.set_latest_dataset("mdb-503-2024");
        let ticket = state.begin_load(SupportingFileKey::Routes);
        state.finish_load(ticket, Ok(routes_payload()));

        assert!(!state.set_feed("mdb-503", Some(DataType::Gtfs)));
        assert!(state.state(SupportingFileKey::Routes).is_loaded());
        assert_eq!(state.context().dataset_id.as_deref(), Some("mdb-503-2024"));
    }

    #[test]
    fn test_set_latest_dataset_warrants_routes_fetch() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));

        assert!(state.set_latest_dataset("mdb-503-2024"));
        // Same dataset again carries no new work
        assert!(!state.set_latest_dataset("mdb-503-2024"));
        // A newer dataset does
        assert!(state.set_latest_dataset("mdb-503-2025"));
    }

    #[test]
    fn test_set_latest_dataset_without_feed() {
        let mut state = SupportingFiles::new();
        // The dataset is recorded but a fetch is not warranted yet
        assert!(!state.set_latest_dataset("mdb-503-2024"));
        assert_eq!(state.context().dataset_id.as_deref(), Some("mdb-503-2024"));
    }

    #[test]
    fn test_begin_load_marks_loading() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));

        let ticket = state.begin_load(SupportingFileKey::CoverageGeojson);
        assert_eq!(ticket.key(), SupportingFileKey::CoverageGeojson);
        assert!(state.is_loading(SupportingFileKey::CoverageGeojson));
        assert!(!state.is_loading(SupportingFileKey::Routes));
    }

    #[test]
    fn test_finish_load_commits_success() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        state.set_latest_dataset("mdb-503-2024");

        let ticket = state.begin_load(SupportingFileKey::Routes);
        assert!(state.finish_load(ticket, Ok(routes_payload())));

        let entry = state.state(SupportingFileKey::Routes);
        assert!(entry.is_loaded());
        assert_eq!(entry.data(), Some(&routes_payload()));
    }

    #[test]
    fn test_finish_load_records_failure() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));

        let ticket = state.begin_load(SupportingFileKey::Routes);
        assert!(state.finish_load(ticket, Err("HTTP 404: not extracted".to_string())));

        let entry = state.state(SupportingFileKey::Routes);
        assert!(entry.is_failed());
        assert_eq!(entry.error(), Some("HTTP 404: not extracted"));
        assert!(!entry.is_loading());
    }

    #[test]
    fn test_stale_result_dropped_after_feed_switch() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        let ticket = state.begin_load(SupportingFileKey::Routes);

        // The view moves on while the fetch is in flight
        state.set_feed("mdb-504", Some(DataType::Gtfs));

        assert!(!state.finish_load(ticket, Ok(routes_payload())));
        assert_eq!(
            state.state(SupportingFileKey::Routes),
            &SupportingFileState::Uninitialized
        );
    }

    #[test]
    fn test_stale_result_dropped_after_dataset_change() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        state.set_latest_dataset("mdb-503-2024");
        let ticket = state.begin_load(SupportingFileKey::Routes);

        state.set_latest_dataset("mdb-503-2025");

        assert!(!state.finish_load(ticket, Ok(routes_payload())));
        assert_eq!(
            state.state(SupportingFileKey::Routes),
            &SupportingFileState::Uninitialized
        );
    }

    #[test]
    fn test_stale_failure_also_dropped() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        let ticket = state.begin_load(SupportingFileKey::CoverageGeojson);

        state.set_feed("mdb-504", Some(DataType::Gtfs));

        assert!(!state.finish_load(ticket, Err("timed out".to_string())));
        assert_eq!(
            state.state(SupportingFileKey::CoverageGeojson),
            &SupportingFileState::Uninitialized
        );
    }

    #[test]
    fn test_replaced_load_still_commits_under_same_context() {
        // Two loads for the same key under one context: no ordering is
        // guaranteed, the last committed result wins
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));

        let first = state.begin_load(SupportingFileKey::Routes);
        let second = state.begin_load(SupportingFileKey::Routes);

        assert!(state.finish_load(first, Ok(routes_payload())));
        assert!(state.finish_load(second, Err("slow mirror".to_string())));
        assert!(state.state(SupportingFileKey::Routes).is_failed());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = SupportingFiles::new();
        state.set_feed("mdb-503", Some(DataType::Gtfs));
        state.set_latest_dataset("mdb-503-2024");
        let ticket = state.begin_load(SupportingFileKey::Routes);
        state.finish_load(ticket, Ok(routes_payload()));

        state.reset();
        assert_eq!(state.context(), &FeedContext::default());
        assert_eq!(
            state.state(SupportingFileKey::Routes),
            &SupportingFileState::Uninitialized
        );
    }
}
