//! An event store that lives in memory
//!
//! It behaves like the remote store (it assigns IDs on creation, and rejects unknown IDs with a 404), so that it can stand for it in tests.
//! It can also hold events that have never been sent to a server, until they are migrated with [`EventStore::bulk_sync`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{CalendarEvent, EventId};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::{EventStore, Listing};

/// A request that has been made to a [`MemoryStore`]
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCall {
    List,
    Upsert(CalendarEvent),
    Delete(EventId),
    BulkSync(Vec<CalendarEvent>),
}

#[derive(Default)]
struct MemoryData {
    events: Vec<CalendarEvent>,
    behaviour: MockBehaviour,
    calls: Vec<StoreCall>,
    /// Delays applied to the next requests, in order
    latencies: VecDeque<Duration>,
}

/// An [`EventStore`] that keeps its events in memory.
///
/// Clones share the same data, so that a test can keep a handle on a store it has handed over.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already contains some events. Events without an ID are given one.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        let store = Self::new();
        for event in events {
            store.insert(event);
        }
        store
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an event without going through the [`EventStore`] API (this is not recorded as a call)
    pub fn insert(&self, event: CalendarEvent) -> CalendarEvent {
        let event = with_assigned_id(event);
        self.data().events.push(event.clone());
        event
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.data().events.clone()
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.data().behaviour = behaviour;
    }

    /// Delay the next request by `latency`. Several calls queue delays for the following requests.
    pub fn push_latency(&self, latency: Duration) {
        self.data().latencies.push_back(latency);
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.data().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.data().calls.clear();
    }

    /// Record a call, and return the delay to apply to it
    fn record(&self, call: StoreCall) -> Option<Duration> {
        let mut data = self.data();
        data.calls.push(call);
        data.latencies.pop_front()
    }
}

fn with_assigned_id(mut event: CalendarEvent) -> CalendarEvent {
    if event.id().is_none() {
        event.set_id(Some(EventId::Text(Uuid::new_v4().to_hyphenated().to_string())));
    }
    event
}

fn not_found(id: &EventId) -> CalendarError {
    CalendarError::transport(Some(StatusCode::NOT_FOUND), format!("no event with ID {}", id))
}

async fn wait(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list(&self) -> CalendarResult<Listing> {
        let latency = self.record(StoreCall::List);
        // The answer is what the store contained when the request arrived, however long it takes to come back
        let answer = {
            let mut data = self.data();
            data.behaviour.can_list().map(|_| Listing::from(data.events.clone()))
        };
        wait(latency).await;
        answer
    }

    async fn upsert(&self, event: &CalendarEvent) -> CalendarResult<CalendarEvent> {
        let latency = self.record(StoreCall::Upsert(event.clone()));
        let answer = {
            let mut data = self.data();
            data.behaviour.can_upsert().and_then(|_| {
                match event.id() {
                    None => {
                        let created = with_assigned_id(event.clone());
                        data.events.push(created.clone());
                        Ok(created)
                    },
                    Some(id) => match data.events.iter_mut().find(|e| e.id() == Some(id)) {
                        None => Err(not_found(id)),
                        Some(existing) => {
                            *existing = event.clone();
                            Ok(event.clone())
                        },
                    },
                }
            })
        };
        wait(latency).await;
        answer
    }

    async fn delete(&self, id: &EventId) -> CalendarResult<()> {
        let latency = self.record(StoreCall::Delete(id.clone()));
        let answer = {
            let mut data = self.data();
            data.behaviour.can_delete().and_then(|_| {
                let before = data.events.len();
                data.events.retain(|e| e.id() != Some(id));
                if data.events.len() == before {
                    Err(not_found(id))
                } else {
                    Ok(())
                }
            })
        };
        wait(latency).await;
        answer
    }

    /// Events with a known ID replace the stored ones, the others are added
    async fn bulk_sync(&self, events: &[CalendarEvent]) -> CalendarResult<Vec<CalendarEvent>> {
        let latency = self.record(StoreCall::BulkSync(events.to_vec()));
        let answer = {
            let mut data = self.data();
            data.behaviour.can_bulk_sync().map(|_| {
                for event in events {
                    let existing = event.id()
                        .and_then(|id| data.events.iter().position(|e| e.id() == Some(id)));
                    match existing {
                        Some(index) => data.events[index] = event.clone(),
                        None => data.events.push(with_assigned_id(event.clone())),
                    }
                }
                data.events.clone()
            })
        };
        wait(latency).await;
        answer
    }
}
