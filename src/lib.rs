//! This crate provides the core of a month-view calendar whose events live in a remote store.
//!
//! It provides a REST client in the [`client`] module, that can be used as a stand-alone module.
//! Any other [`EventStore`](traits::EventStore) can be used instead, e.g. the in-memory [`MemoryStore`](memory::MemoryStore).
//!
//! A [`CalendarController`] keeps a local mirror of a store, and reloads it entirely after every change it makes, so that the mirror never drifts from the store.
//! It also tells which events go on which day of the displayed month. \
//! Drawing is not handled here: a UI implements [`Presenter`](presenter::Presenter), and a [`CalendarWidget`] drives it.

pub mod traits;
pub mod error;
pub use error::{CalendarError, CalendarResult};

mod event;
pub use event::{CalendarEvent, EventId};
pub mod when;
pub use when::When;
pub mod month;
pub use month::{DisplayedMonth, Step};
pub mod grid;
pub mod draft;
pub use draft::{DialogMode, EventDraft};

pub mod client;
pub mod memory;
pub mod mock_behaviour;

pub mod status;
pub mod controller;
pub use controller::CalendarController;
pub mod presenter;
pub mod widget;
pub use widget::CalendarWidget;

pub mod config;

/// A controller backed by the remote store
pub type RemoteCalendarController = CalendarController<client::Client>;
