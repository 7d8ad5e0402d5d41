//! Supporting-file coordination for feed views
//!
//! A feed view carries map-adjacent files next to the catalog entities:
//! the coverage geometry of its latest dataset and the dataset's route
//! listing extract. Loads are asynchronous and the view can move to a
//! different feed or dataset while one is in flight; the state machine
//! here guarantees a late result is never displayed against a context it
//! does not belong to.
//!
//! The module is organized into:
//! - `types`: keys, payloads, load states, context, and load tickets
//! - `state`: the pure state container with the stale-result guard
//! - `session`: the async facade wiring the container to the client

pub mod session;
pub mod state;
pub mod types;

pub use session::FeedSession;
pub use state::SupportingFiles;
pub use types::{
    FeedContext, LoadTicket, RouteRow, RouteTypeValue, SupportingFileData, SupportingFileKey,
    SupportingFileState,
};
