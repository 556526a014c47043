use async_trait::async_trait;

use crate::error::CalendarResult;
use crate::event::{CalendarEvent, EventId};

/// The answer of a store to a [`EventStore::list`] request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub events: Vec<CalendarEvent>,
    /// What the store answered instead of a list of events, if it did. `events` is empty in this case.
    pub unexpected_payload: Option<String>,
}

impl Listing {
    /// A store answer that was not a list of events
    pub fn unexpected<S: ToString>(payload: S) -> Self {
        Self { events: Vec::new(), unexpected_payload: Some(payload.to_string()) }
    }

    /// Whether the answer has been turned into an empty list
    pub fn is_normalized(&self) -> bool {
        self.unexpected_payload.is_some()
    }
}

impl From<Vec<CalendarEvent>> for Listing {
    fn from(events: Vec<CalendarEvent>) -> Self {
        Self { events, unexpected_payload: None }
    }
}


/// A place where calendar events are stored, usually a remote server (see [`Client`](crate::client::Client)).
///
/// Every operation is a single attempt: nothing is retried automatically.
/// Failures carry the HTTP status when there is one, so that callers can tell a missing event from a server failure.
#[async_trait]
pub trait EventStore {
    /// Returns every event of the store, for all months
    async fn list(&self) -> CalendarResult<Listing>;

    /// Updates the event if it has an ID, creates it otherwise.
    /// Returns the store's version of the event (that has its ID assigned in case of a creation)
    async fn upsert(&self, event: &CalendarEvent) -> CalendarResult<CalendarEvent>;

    async fn delete(&self, id: &EventId) -> CalendarResult<()>;

    /// Merges a whole collection into the store in a single round trip.
    /// This is used to migrate events that have only been stored locally so far.
    async fn bulk_sync(&self, events: &[CalendarEvent]) -> CalendarResult<Vec<CalendarEvent>>;
}
