//! This module keeps a local mirror of an event store, and everything a month view needs to display it
//!
//! The mirror is never patched locally: after every successful change, the whole collection is downloaded again.
//! This costs a round trip, but the calendar can never show an event the store has not confirmed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};

use crate::config::DEFAULT_EVENT_HOUR;
use crate::draft::EventDraft;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{CalendarEvent, EventId};
use crate::grid::{self, Exclusion, MonthGrid};
use crate::month::{DisplayedMonth, Step};
use crate::status::{StatusReporter, StatusSender};
use crate::traits::EventStore;


/// What a call to [`CalendarController::initialize`] has done
#[derive(Clone, Debug, PartialEq)]
pub struct LoadReport {
    /// Number of events received
    pub total: usize,
    /// Number of events that can be placed on the calendar
    pub placed: usize,
    /// Events whose date cannot be understood. They are kept in the collection anyway.
    pub exclusions: Vec<Exclusion>,
    /// `false` when a newer load had already been applied, and this result has been discarded
    pub applied: bool,
    /// What the store answered instead of a list of events, if it did. The collection is emptied in this case.
    pub unexpected_payload: Option<String>,
}

struct ControllerState {
    displayed_month: DisplayedMonth,
    events: Vec<CalendarEvent>,
    exclusions: Vec<Exclusion>,
    /// The event being edited, `None` when the dialog is closed or creates a new event
    selection: Option<CalendarEvent>,
    /// Ticket of the load whose result is currently displayed
    applied_ticket: u64,
}

/// Releases the "request in flight" flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}


/// Owns the events displayed by a calendar, and keeps them in sync with an [`EventStore`]
///
/// Operations take `&self`, so that a UI can keep a handle on the controller while a request is pending.
/// Changes (submit, remove, migrate) are serialized: while one is in flight, the next is refused with [`CalendarError::Busy`].
/// Loads are tagged with an increasing ticket, so that an older answer never overwrites a newer collection.
pub struct CalendarController<S: EventStore> {
    store: S,
    state: Mutex<ControllerState>,
    next_ticket: AtomicU64,
    change_in_flight: AtomicBool,
    status: StatusReporter,
}

impl<S: EventStore> CalendarController<S> {
    /// Create a controller that displays `month`. No event is loaded until [`Self::initialize`] is called.
    pub fn new(store: S, month: DisplayedMonth) -> Self {
        Self {
            store,
            state: Mutex::new(ControllerState {
                displayed_month: month,
                events: Vec::new(),
                exclusions: Vec::new(),
                selection: None,
                applied_ticket: 0,
            }),
            next_ticket: AtomicU64::new(0),
            change_in_flight: AtomicBool::new(false),
            status: StatusReporter::new(),
        }
    }

    /// Same as [`Self::new`], but status reports are also sent to `channel`
    pub fn new_with_status(store: S, month: DisplayedMonth, channel: StatusSender) -> Self {
        let mut controller = Self::new(store, month);
        controller.status = StatusReporter::new_with_channel(channel);
        controller
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn store(&self) -> &S { &self.store }

    pub fn displayed_month(&self) -> DisplayedMonth {
        self.state().displayed_month
    }

    /// The whole collection, for all months
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.state().events.clone()
    }

    /// Events of the collection that cannot be placed on the calendar
    pub fn exclusions(&self) -> Vec<Exclusion> {
        self.state().exclusions.clone()
    }

    pub fn selection(&self) -> Option<CalendarEvent> {
        self.state().selection.clone()
    }

    /// Whether a change is waiting for the store (e.g. to disable a "save" button)
    pub fn is_busy(&self) -> bool {
        self.change_in_flight.load(Ordering::SeqCst)
    }


    /// Download the whole collection from the store, and replace the local one.
    ///
    /// In case of error, the collection is emptied: the calendar displays nothing rather than stale data.
    /// This is also the case when the store answers something else than a list: the answer is `Ok`, but an error status is reported.
    /// Either way, the controller is ready to render afterwards.
    pub async fn initialize(&self) -> CalendarResult<LoadReport> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.store.list().await;

        let mut state = self.state();
        if ticket < state.applied_ticket {
            log::debug!("Discarding the answer of load #{}, load #{} has already been applied", ticket, state.applied_ticket);
            return result.map(|listing| LoadReport {
                total: listing.events.len(),
                placed: 0,
                exclusions: Vec::new(),
                applied: false,
                unexpected_payload: listing.unexpected_payload,
            });
        }
        state.applied_ticket = ticket;

        match result {
            Ok(listing) if listing.is_normalized() => {
                state.events = Vec::new();
                state.exclusions = Vec::new();
                drop(state);

                let payload = listing.unexpected_payload.unwrap_or_default();
                self.status.error(&format!("Unable to load events: the store answered {} instead of a list", payload));
                Ok(LoadReport {
                    total: 0,
                    placed: 0,
                    exclusions: Vec::new(),
                    applied: true,
                    unexpected_payload: Some(payload),
                })
            },
            Ok(listing) => {
                let events = listing.events;
                let (placed, exclusions) = grid::place(&events);
                let report = LoadReport {
                    total: events.len(),
                    placed: placed.values().map(Vec::len).sum(),
                    exclusions: exclusions.clone(),
                    applied: true,
                    unexpected_payload: None,
                };
                state.events = events;
                state.exclusions = exclusions;
                drop(state);

                self.status.info(&format!("Loaded {} events", report.total));
                Ok(report)
            },
            Err(err) => {
                state.events = Vec::new();
                state.exclusions = Vec::new();
                drop(state);

                self.status.error(&format!("Unable to load events: {}", err));
                Err(err)
            },
        }
    }

    /// Display the previous or next month. The collection is left untouched.
    pub fn navigate(&self, step: Step) -> DisplayedMonth {
        let mut state = self.state();
        match state.displayed_month.step(step) {
            Some(month) => state.displayed_month = month,
            None => log::warn!("Cannot navigate past {}", state.displayed_month),
        }
        state.displayed_month
    }

    /// Display an arbitrary month
    pub fn go_to(&self, month: DisplayedMonth) {
        self.state().displayed_month = month;
    }

    /// Events that happen on the given day of the displayed month, in collection order
    pub fn events_on_day(&self, day: u32) -> Vec<CalendarEvent> {
        let state = self.state();
        match state.displayed_month.day(day) {
            None => Vec::new(),
            Some(date) => grid::events_on(date, &state.events),
        }
    }

    /// The render model of the displayed month
    pub fn grid(&self, today: NaiveDate) -> MonthGrid {
        let state = self.state();
        MonthGrid::build(state.displayed_month, &state.events, today)
    }


    /// Start creating an event on a day of the displayed month
    pub fn begin_create(&self, day: u32) -> CalendarResult<EventDraft> {
        let mut state = self.state();
        let date = state.displayed_month.day(day).ok_or_else(|| {
            CalendarError::validation(format!("there is no day {} in {}", day, state.displayed_month))
        })?;
        state.selection = None;

        let noon = NaiveTime::from_hms_opt(DEFAULT_EVENT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
        Ok(EventDraft::new(date, noon))
    }

    /// Start editing an existing event
    pub fn begin_edit(&self, event: &CalendarEvent) -> CalendarResult<EventDraft> {
        let draft = EventDraft::from_event(event)?;
        self.state().selection = Some(event.clone());
        Ok(draft)
    }

    /// Close the dialog without saving
    pub fn cancel(&self) {
        self.state().selection = None;
    }

    /// Send a draft to the store (as a creation, or as an update of the selected event), then reload everything.
    ///
    /// Nothing is sent if the draft is invalid. In case of failure, the collection and the selection are left untouched, so that the user can retry.
    /// On success, the dialog is closed unless another event has been selected meanwhile.
    pub async fn submit(&self, draft: &EventDraft) -> CalendarResult<CalendarEvent> {
        let editing = self.selection();
        let payload = match draft.to_event(editing.as_ref().and_then(|e| e.id().cloned())) {
            Ok(payload) => payload,
            Err(err) => {
                self.status.warn(&err.to_string());
                return Err(err);
            },
        };

        let _in_flight = self.begin_change()?;
        let saved = match self.store.upsert(&payload).await {
            Ok(saved) => saved,
            Err(err) => {
                self.status.error(&format!("Unable to save event {}: {}", payload.label(), err));
                return Err(err);
            },
        };

        let resync = self.initialize().await;
        self.release_selection(editing.as_ref().and_then(|e| e.id()));
        if resynced(&resync) {
            let verb = if editing.is_some() { "updated" } else { "created" };
            self.status.success(&format!("Event {} {}", saved.label(), verb));
        }
        Ok(saved)
    }

    /// Delete an event from the store, then reload everything.
    ///
    /// Asking the user for confirmation is up to the caller.
    pub async fn remove(&self, event: &CalendarEvent) -> CalendarResult<()> {
        let id = match event.id() {
            Some(id) => id.clone(),
            None => {
                let err = CalendarError::validation(format!("event {} has not been created yet", event.label()));
                self.status.warn(&err.to_string());
                return Err(err);
            },
        };

        let _in_flight = self.begin_change()?;
        if let Err(err) = self.store.delete(&id).await {
            self.status.error(&format!("Unable to delete event {}: {}", event.label(), err));
            return Err(err);
        }

        let resync = self.initialize().await;
        self.release_selection(Some(&id));
        if resynced(&resync) {
            self.status.success(&format!("Event {} deleted", event.label()));
        }
        Ok(())
    }

    /// Upload events that have only been stored locally so far, then reload everything.
    pub async fn migrate(&self, local_events: &[CalendarEvent]) -> CalendarResult<Vec<CalendarEvent>> {
        let _in_flight = self.begin_change()?;
        let merged = match self.store.bulk_sync(local_events).await {
            Ok(merged) => merged,
            Err(err) => {
                self.status.error(&format!("Unable to migrate {} local events: {}", local_events.len(), err));
                return Err(err);
            },
        };

        if resynced(&self.initialize().await) {
            self.status.success(&format!("Migrated {} local events", local_events.len()));
        }
        Ok(merged)
    }

    /// Close the dialog of an event that has just been saved or deleted.
    /// The selection is kept if the user has started editing another event in the meantime.
    fn release_selection(&self, done_with: Option<&EventId>) {
        let mut state = self.state();
        if state.selection.as_ref().and_then(|e| e.id()) == done_with {
            state.selection = None;
        }
    }

    fn begin_change(&self) -> CalendarResult<InFlight<'_>> {
        if self.change_in_flight.swap(true, Ordering::SeqCst) {
            self.status.warn("Please wait, another change is still being saved");
            return Err(CalendarError::Busy);
        }
        Ok(InFlight(&self.change_in_flight))
    }
}

/// Whether a reload has brought the collection up to date
fn resynced(load: &CalendarResult<LoadReport>) -> bool {
    matches!(load, Ok(report) if report.unexpected_payload.is_none())
}
