//! Client-side data access: fetching conferences from a server or a local
//! catalog, and the view state that consumes those fetches.

pub mod error;
pub mod latest;
pub mod source;
pub mod view;

pub use error::FetchError;
pub use latest::{RequestGeneration, RequestTicket};
pub use source::{ConferenceSource, HttpConferenceClient, StaticSource};
pub use view::{ConferenceView, DetailState, ListState, LoadOutcome};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
