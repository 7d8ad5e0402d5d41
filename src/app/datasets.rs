//! Dataset history utilities
//!
//! A feed's dataset history arrives from the catalog in pages. This module
//! combines pages into one deduplicated, newest-first list and decides
//! whether more pages are worth requesting.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::app::client::CatalogClient;
use crate::app::models::GtfsDataset;
use crate::constants::pagination;
use crate::errors::ApiResult;

/// Record shape required by the page-combining utilities
pub trait DatasetRecord {
    /// Stable identifier deduplication keys on
    fn record_id(&self) -> &str;

    /// Download timestamp ordering keys on, when known
    fn record_timestamp(&self) -> Option<DateTime<Utc>>;
}

impl DatasetRecord for GtfsDataset {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn record_timestamp(&self) -> Option<DateTime<Utc>> {
        self.downloaded_at
    }
}

/// Combines a freshly fetched page with previously accumulated records.
///
/// The result carries each identifier once; when a page re-delivers an id
/// that was already accumulated, the accumulated record wins. Records are
/// ordered by download timestamp, newest first, under a stable sort on a
/// total key: records without a timestamp sort after every dated one and
/// keep their relative order.
pub fn merge_dataset_pages<T>(new_page: &[T], existing: Option<&[T]>) -> Vec<T>
where
    T: DatasetRecord + Clone,
{
    let existing = existing.unwrap_or_default();
    let mut seen: HashSet<&str> = existing.iter().map(|record| record.record_id()).collect();

    let mut merged: Vec<T> = existing.to_vec();
    for record in new_page {
        if seen.insert(record.record_id()) {
            merged.push(record.clone());
        }
    }

    merged.sort_by_key(|record| Reverse(record.record_timestamp()));
    merged
}

/// Whether a fetched page implies more records remain on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCompleteness {
    /// The server holds nothing beyond what was loaded
    Complete,
    /// More records remain to request
    Incomplete,
    /// The request shape carries no signal either way
    Unknown,
}

impl ListCompleteness {
    /// Check if the list is known to be fully loaded
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Decides whether a fetched page means the collection is fully loaded.
///
/// The rules apply in priority order:
/// 1. Neither limit nor offset was requested: the response was everything.
/// 2. A limit was requested and the page came back short of it.
/// 3. An offset without a limit: the page size carries no signal.
/// 4. Otherwise more records are assumed to remain.
pub fn page_completeness(
    loaded: usize,
    limit: Option<usize>,
    offset: Option<usize>,
) -> ListCompleteness {
    match (limit, offset) {
        (None, None) => ListCompleteness::Complete,
        (Some(limit), _) if loaded < limit => ListCompleteness::Complete,
        (None, Some(_)) => ListCompleteness::Unknown,
        _ => ListCompleteness::Incomplete,
    }
}

/// Walks a feed's full dataset history page by page.
///
/// Pages are folded through [`merge_dataset_pages`], so the result is
/// deduplicated and newest-first. Walking stops when a page reports the
/// history complete or when the page cap is reached.
///
/// # Arguments
///
/// * `client` - Catalog client to fetch pages with
/// * `feed_id` - Catalog feed identifier
/// * `token` - Optional bearer token, attached per request
///
/// # Errors
///
/// Returns the first `ApiError` a page fetch surfaces; already accumulated
/// pages are dropped with it, the walk is all or nothing
pub async fn fetch_dataset_history(
    client: &CatalogClient,
    feed_id: &str,
    token: Option<&str>,
) -> ApiResult<Vec<GtfsDataset>> {
    walk_history(feed_id, move |limit, offset| {
        client.list_gtfs_datasets(feed_id, Some(limit), Some(offset), token)
    })
    .await
}

/// Page-folding loop behind [`fetch_dataset_history`], generic over the
/// page source so the walk can be exercised without a live server.
async fn walk_history<F, Fut>(feed_id: &str, mut fetch_page: F) -> ApiResult<Vec<GtfsDataset>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = ApiResult<Vec<GtfsDataset>>>,
{
    let limit = pagination::HISTORY_PAGE_SIZE;
    let mut merged: Vec<GtfsDataset> = Vec::new();

    for page_index in 0..pagination::MAX_HISTORY_PAGES {
        let offset = page_index * limit;
        let page = fetch_page(limit, offset).await?;
        let loaded = page.len();
        merged = merge_dataset_pages(&page, Some(&merged));

        match page_completeness(loaded, Some(limit), Some(offset)) {
            ListCompleteness::Complete => {
                tracing::debug!(
                    "Dataset history for {} complete: {} records over {} pages",
                    feed_id,
                    merged.len(),
                    page_index + 1
                );
                return Ok(merged);
            }
            ListCompleteness::Unknown => {
                tracing::warn!(
                    "Dataset history completeness for {} is undecidable, stopping",
                    feed_id
                );
                return Ok(merged);
            }
            ListCompleteness::Incomplete => {}
        }
    }

    tracing::warn!(
        "Dataset history for {} still incomplete after {} pages, stopping",
        feed_id,
        pagination::MAX_HISTORY_PAGES
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::errors::{ApiError, ErrorBody};

    fn dataset(id: &str, downloaded_at: Option<&str>) -> GtfsDataset {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "downloaded_at": downloaded_at,
        }))
        .unwrap()
    }

    fn noted_dataset(id: &str, downloaded_at: Option<&str>, note: &str) -> GtfsDataset {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "downloaded_at": downloaded_at,
            "note": note,
        }))
        .unwrap()
    }

    fn ids(records: &[GtfsDataset]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn test_merge_is_idempotent() {
        let page = vec![
            dataset("d-2", Some("2024-02-01T00:00:00Z")),
            dataset("d-1", Some("2024-01-01T00:00:00Z")),
        ];

        let once = merge_dataset_pages(&page, None);
        let twice = merge_dataset_pages(&page, Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_orders_newest_first() {
        let page = vec![
            dataset("old", Some("2023-06-01T00:00:00Z")),
            dataset("new", Some("2024-06-01T00:00:00Z")),
            dataset("mid", Some("2023-12-01T00:00:00Z")),
        ];

        let merged = merge_dataset_pages(&page, None);
        assert_eq!(ids(&merged), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_merge_existing_wins_on_conflict() {
        let existing = vec![
            noted_dataset("d-2", Some("2024-02-01T00:00:00Z"), "kept"),
            noted_dataset("d-1", Some("2024-01-01T00:00:00Z"), "kept"),
        ];
        let page = vec![
            noted_dataset("d-2", Some("2024-02-01T00:00:00Z"), "replayed"),
            noted_dataset("d-0", Some("2023-12-01T00:00:00Z"), "fresh"),
        ];

        let merged = merge_dataset_pages(&page, Some(&existing));
        assert_eq!(ids(&merged), vec!["d-2", "d-1", "d-0"]);

        // The accumulated record survived the replay
        assert_eq!(merged[0].note.as_deref(), Some("kept"));
    }

    #[test]
    fn test_merge_keeps_undated_order() {
        // With no timestamps every comparison is equal, and the stable
        // sort must leave the input order untouched
        let page = vec![
            dataset("first", None),
            dataset("second", None),
            dataset("third", None),
        ];

        let merged = merge_dataset_pages(&page, None);
        assert_eq!(ids(&merged), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_merge_with_mixed_timestamps_keeps_every_record() {
        let page = vec![
            dataset("undated-a", None),
            dataset("new", Some("2024-06-01T00:00:00Z")),
            dataset("undated-b", None),
            dataset("old", Some("2023-06-01T00:00:00Z")),
        ];

        let merged = merge_dataset_pages(&page, None);

        // Dated records newest first, undated after them in input order
        assert_eq!(ids(&merged), vec!["new", "old", "undated-a", "undated-b"]);
    }

    #[test]
    fn test_merge_keeps_dated_descending_across_undated() {
        // An undated record sitting between two dated ones must not stop
        // the dated records from trading places
        let page = vec![
            dataset("old", Some("2024-01-02T00:00:00Z")),
            dataset("undated", None),
            dataset("new", Some("2024-01-20T00:00:00Z")),
        ];

        let merged = merge_dataset_pages(&page, None);
        assert_eq!(ids(&merged), vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_merge_empty_inputs() {
        let merged = merge_dataset_pages::<GtfsDataset>(&[], None);
        assert!(merged.is_empty());

        let existing = vec![dataset("d-1", Some("2024-01-01T00:00:00Z"))];
        let merged = merge_dataset_pages(&[], Some(&existing));
        assert_eq!(ids(&merged), vec!["d-1"]);
    }

    #[test]
    fn test_completeness_without_paging() {
        assert_eq!(page_completeness(3, None, None), ListCompleteness::Complete);
        assert_eq!(page_completeness(0, None, None), ListCompleteness::Complete);
    }

    #[test]
    fn test_completeness_short_page() {
        // Short of the requested limit means the server ran out
        assert_eq!(
            page_completeness(3, Some(5), Some(10)),
            ListCompleteness::Complete
        );
        assert_eq!(
            page_completeness(0, Some(5), None),
            ListCompleteness::Complete
        );
    }

    #[test]
    fn test_completeness_offset_without_limit() {
        assert_eq!(
            page_completeness(3, None, Some(0)),
            ListCompleteness::Unknown
        );
        assert_eq!(
            page_completeness(0, None, Some(50)),
            ListCompleteness::Unknown
        );
    }

    #[test]
    fn test_completeness_full_page() {
        assert_eq!(
            page_completeness(5, Some(5), None),
            ListCompleteness::Incomplete
        );
        assert_eq!(
            page_completeness(5, Some(5), Some(10)),
            ListCompleteness::Incomplete
        );

        // A zero limit can never be undershot
        assert_eq!(
            page_completeness(0, Some(0), Some(0)),
            ListCompleteness::Incomplete
        );
    }

    #[test]
    fn test_completeness_predicate() {
        assert!(ListCompleteness::Complete.is_complete());
        assert!(!ListCompleteness::Incomplete.is_complete());
        assert!(!ListCompleteness::Unknown.is_complete());
    }

    /// Page of `len` datasets whose ids continue from `start`, each one
    /// hour older than the last, so fetch order is already newest-first
    fn history_page(start: usize, len: usize) -> Vec<GtfsDataset> {
        (start..start + len)
            .map(|index| {
                let stamp = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z").unwrap()
                    - chrono::Duration::hours(index as i64);
                dataset(&format!("d-{:04}", index), Some(&stamp.to_rfc3339()))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_history_walk_folds_pages_until_short_page() {
        let full = pagination::HISTORY_PAGE_SIZE;
        let mut pages = VecDeque::from(vec![
            history_page(0, full),
            history_page(full, full),
            history_page(2 * full, 3),
        ]);
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let seen = offsets.clone();

        let merged = walk_history("mdb-1", move |limit, offset| {
            assert_eq!(limit, full);
            seen.borrow_mut().push(offset);
            let page = pages.pop_front().unwrap_or_default();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(*offsets.borrow(), vec![0, full, 2 * full]);
        assert_eq!(merged.len(), 2 * full + 3);
        assert_eq!(merged.first().unwrap().id, "d-0000");
        assert_eq!(merged.last().unwrap().id, format!("d-{:04}", 2 * full + 2));
    }

    #[tokio::test]
    async fn test_history_walk_single_short_page() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();

        let merged = walk_history("mdb-1", move |_limit, _offset| {
            counter.set(counter.get() + 1);
            async { Ok(history_page(0, 3)) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(merged.len(), 3);
    }

    #[tokio::test]
    async fn test_history_walk_dedupes_replayed_pages() {
        // A server that keeps replaying the same full page must not grow
        // the result, and the defensive cap must end the walk
        let full = pagination::HISTORY_PAGE_SIZE;
        let replay = history_page(0, full);
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();

        let merged = walk_history("mdb-1", move |_limit, _offset| {
            counter.set(counter.get() + 1);
            let page = replay.clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), pagination::MAX_HISTORY_PAGES);
        assert_eq!(merged.len(), full);
    }

    #[tokio::test]
    async fn test_history_walk_surfaces_page_errors() {
        let full = pagination::HISTORY_PAGE_SIZE;
        let mut pages = VecDeque::from(vec![history_page(0, full)]);

        let result = walk_history("mdb-1", move |_limit, _offset| {
            let next = pages.pop_front();
            async move {
                next.ok_or(ApiError::Status {
                    status: 503,
                    body: ErrorBody::Text("history backend down".to_string()),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ApiError::Status { status: 503, .. })));
    }
}
