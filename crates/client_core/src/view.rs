//! List and detail view state driven by a [`ConferenceSource`].
//!
//! Each load supersedes the previous one for the same slot. A fetch that
//! resolves after a newer one started is dropped, and a fetch that is applied
//! replaces the slot's data wholesale.

use std::sync::Arc;

use shared::{
    domain::{Conference, ConferenceId},
    filter::FilterCriteria,
};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    error::FetchError,
    latest::{RequestGeneration, RequestTicket},
    source::ConferenceSource,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Ready(Vec<Conference>),
    Error(FetchError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(ConferenceId),
    Ready(Conference),
    NotFound(ConferenceId),
    Error(FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started before this one resolved.
    Discarded,
}

struct Slot<T> {
    state: watch::Sender<T>,
    generation: RequestGeneration,
}

impl<T: Default> Slot<T> {
    fn new() -> Self {
        Self {
            state: watch::channel(T::default()).0,
            generation: RequestGeneration::new(),
        }
    }

    fn begin(&self, loading: T) -> RequestTicket {
        let ticket = self.generation.begin();
        self.publish_if_current(&ticket, loading);
        ticket
    }

    // The currency check runs under the channel's write lock, so a superseded
    // response can never land after a newer request published its state.
    fn publish_if_current(&self, ticket: &RequestTicket, next: T) -> bool {
        self.state.send_if_modified(|state| {
            if ticket.is_current() {
                *state = next;
                true
            } else {
                false
            }
        })
    }

    fn resolve(&self, ticket: &RequestTicket, next: T) -> LoadOutcome {
        if self.publish_if_current(ticket, next) {
            LoadOutcome::Applied
        } else {
            debug!(generation = ticket.generation(), "discarding superseded response");
            LoadOutcome::Discarded
        }
    }
}

pub struct ConferenceView {
    source: Arc<dyn ConferenceSource>,
    list: Slot<ListState>,
    detail: Slot<DetailState>,
}

impl ConferenceView {
    pub fn new(source: Arc<dyn ConferenceSource>) -> Self {
        Self {
            source,
            list: Slot::new(),
            detail: Slot::new(),
        }
    }

    pub fn list_state(&self) -> ListState {
        self.list.state.borrow().clone()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state.borrow().clone()
    }

    pub fn subscribe_list(&self) -> watch::Receiver<ListState> {
        self.list.state.subscribe()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<DetailState> {
        self.detail.state.subscribe()
    }

    pub async fn load_list(&self, criteria: &FilterCriteria) -> LoadOutcome {
        let ticket = self.list.begin(ListState::Loading);
        let next = match self.source.list_conferences(criteria).await {
            Ok(conferences) => ListState::Ready(conferences),
            Err(error) => ListState::Error(error),
        };
        self.list.resolve(&ticket, next)
    }

    pub async fn load_detail(&self, id: &str) -> LoadOutcome {
        let ticket = self.detail.begin(DetailState::Loading(id.into()));
        let next = match self.source.get_conference(id).await {
            Ok(conference) => DetailState::Ready(conference),
            Err(FetchError::NotFound { id }) => DetailState::NotFound(id.into()),
            Err(error) => DetailState::Error(error),
        };
        self.detail.resolve(&ticket, next)
    }
}
