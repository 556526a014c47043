//! A calendar widget: user intents in, presenter calls out

use chrono::{Datelike, Local, NaiveDate};

use crate::controller::{CalendarController, LoadReport};
use crate::draft::{DialogMode, EventDraft};
use crate::error::CalendarResult;
use crate::event::CalendarEvent;
use crate::month::{DisplayedMonth, Step};
use crate::presenter::{self, Presenter};
use crate::status::{status_channel, StatusLevel, StatusReceiver};
use crate::traits::EventStore;

const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this event?";


/// Wires the actions of a user (clicks on days, on events, on buttons...) to a [`CalendarController`], and shows the outcome through a [`Presenter`]
pub struct CalendarWidget<S: EventStore, P: Presenter> {
    controller: CalendarController<S>,
    presenter: P,
    status: StatusReceiver,
    today: NaiveDate,
}

impl<S: EventStore, P: Presenter> CalendarWidget<S, P> {
    /// Create a widget that displays the current month
    pub fn new(store: S, presenter: P) -> Self {
        Self::new_with_today(store, presenter, Local::now().date_naive())
    }

    /// Create a widget that considers `today` is the current date
    pub fn new_with_today(store: S, presenter: P, today: NaiveDate) -> Self {
        let (sender, receiver) = status_channel();
        let controller = CalendarController::new_with_status(store, DisplayedMonth::containing(today), sender);
        Self { controller, presenter, status: receiver, today }
    }

    pub fn controller(&self) -> &CalendarController<S> { &self.controller }
    pub fn presenter(&self) -> &P                      { &self.presenter }
    pub fn presenter_mut(&mut self) -> &mut P          { &mut self.presenter }
    pub fn today(&self) -> NaiveDate                   { self.today }

    /// Load the events, and draw the calendar whatever happens
    pub async fn start(&mut self) -> CalendarResult<LoadReport> {
        let result = self.controller.initialize().await;
        self.render();
        self.forward_status();
        result
    }

    pub fn render(&mut self) {
        let grid = self.controller.grid(self.today);
        presenter::render(&mut self.presenter, &grid);
    }

    pub fn previous_month(&mut self) {
        self.navigate(Step::Previous);
    }

    pub fn next_month(&mut self) {
        self.navigate(Step::Next);
    }

    fn navigate(&mut self, step: Step) {
        self.controller.navigate(step);
        self.render();
    }

    /// A day cell of the displayed month has been clicked
    pub fn day_clicked(&mut self, day: u32) {
        match self.controller.begin_create(day) {
            Ok(draft) => self.presenter.show_dialog(DialogMode::Create, &draft),
            Err(err) => self.presenter.show_status(&err.to_string(), StatusLevel::Warning),
        }
    }

    /// The "add event" button has been clicked: create an event today, or on the first day of the month when today is not displayed
    pub fn add_clicked(&mut self) {
        let month = self.controller.displayed_month();
        let day = if month.contains(self.today) { self.today.day() } else { 1 };
        self.day_clicked(day);
    }

    /// An event chip has been clicked
    pub fn event_clicked(&mut self, event: &CalendarEvent) {
        match self.controller.begin_edit(event) {
            Ok(draft) => self.presenter.show_dialog(DialogMode::Edit, &draft),
            Err(err) => self.presenter.show_status(&err.to_string(), StatusLevel::Warning),
        }
    }

    /// The "save" button of the dialog has been clicked. The dialog only closes once the store has confirmed the change.
    pub async fn save(&mut self, draft: &EventDraft) -> CalendarResult<CalendarEvent> {
        let result = self.controller.submit(draft).await;
        if result.is_ok() {
            self.presenter.hide_dialog();
            self.render();
        }
        self.forward_status();
        result
    }

    /// The "delete" button of the dialog has been clicked.
    ///
    /// Returns `Ok(false)` when there is nothing to delete or the user has changed their mind.
    pub async fn delete_selected(&mut self) -> CalendarResult<bool> {
        let selected = match self.controller.selection() {
            Some(event) => event,
            None => return Ok(false),
        };
        if self.presenter.confirm(DELETE_CONFIRMATION) == false {
            return Ok(false);
        }

        let result = self.controller.remove(&selected).await;
        if result.is_ok() {
            self.presenter.hide_dialog();
            self.render();
        }
        self.forward_status();
        result.map(|_| true)
    }

    pub fn close_dialog(&mut self) {
        self.controller.cancel();
        self.presenter.hide_dialog();
    }

    /// Upload events that were only stored locally, then redraw
    pub async fn migrate(&mut self, local_events: &[CalendarEvent]) -> CalendarResult<Vec<CalendarEvent>> {
        let result = self.controller.migrate(local_events).await;
        self.render();
        self.forward_status();
        result
    }

    /// Show the latest status report, if it has not been shown yet
    fn forward_status(&mut self) {
        if self.status.has_changed().unwrap_or(false) == false {
            return;
        }
        let report = self.status.borrow_and_update().clone();
        if let Some(report) = report {
            self.presenter.show_status(&report.message, report.level);
        }
    }
}
