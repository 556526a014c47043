//! Placement of events on the cells of a month grid

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::event::CalendarEvent;
use crate::month::DisplayedMonth;

/// An event that could not be placed on the grid, because its date cannot be understood
#[derive(Clone, Debug, PartialEq)]
pub struct Exclusion {
    pub event: String,
    pub reason: String,
}

/// Sorts events by date. Events that cannot be placed are returned separately, and logged.
///
/// Events keep their relative order within a day.
pub fn place(events: &[CalendarEvent]) -> (HashMap<NaiveDate, Vec<&CalendarEvent>>, Vec<Exclusion>) {
    let mut placed: HashMap<NaiveDate, Vec<&CalendarEvent>> = HashMap::new();
    let mut excluded = Vec::new();

    for event in events {
        match event.normalized() {
            Ok((date, _)) => placed.entry(date).or_default().push(event),
            Err(err) => {
                log::warn!("Not placing event {} on the calendar: {}", event.label(), err);
                excluded.push(Exclusion {
                    event: event.label(),
                    reason: event.when().malformation().unwrap_or_default().to_string(),
                });
            },
        }
    }

    (placed, excluded)
}

/// The events that happen on a given date, in collection order.
///
/// Events whose date cannot be understood are skipped, and logged.
pub fn events_on(date: NaiveDate, events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    let mut on_date = Vec::new();
    for event in events {
        match event.date() {
            Some(event_date) if event_date == date => on_date.push(event.clone()),
            Some(_) => {},
            None => log::debug!(
                "Skipping event {} while looking for events on {}: {}",
                event.label(), date, event.when().malformation().unwrap_or("no date"),
            ),
        }
    }
    on_date
}


/// A day of the grid
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    date: NaiveDate,
    in_displayed_month: bool,
    is_today: bool,
    events: Vec<CalendarEvent>,
}

impl DayCell {
    pub fn date(&self) -> NaiveDate            { self.date }
    pub fn day(&self) -> u32                   { self.date.day() }
    /// Leading and trailing cells belong to the adjacent months. They are not clickable and carry no events.
    pub fn in_displayed_month(&self) -> bool   { self.in_displayed_month }
    pub fn is_today(&self) -> bool             { self.is_today }
    pub fn events(&self) -> &[CalendarEvent]   { &self.events }
}


/// Everything needed to draw a month: whole weeks, Sunday first
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    month: DisplayedMonth,
    today: NaiveDate,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn build(month: DisplayedMonth, events: &[CalendarEvent], today: NaiveDate) -> Self {
        let (mut placed, _excluded) = place(events);

        let first = month.first_day();
        let last = month.last_day();
        let leading = first.weekday().num_days_from_sunday() as i64;
        let trailing = 6 - last.weekday().num_days_from_sunday() as i64;

        let mut cells = Vec::new();
        for offset in (1..=leading).rev() {
            cells.push(outside_cell(first - Duration::days(offset)));
        }
        for day in 1..=month.days_in_month() {
            let date = match month.day(day) {
                Some(date) => date,
                None => continue,
            };
            let events = placed.remove(&date)
                .unwrap_or_default()
                .into_iter()
                .cloned()
                .collect();
            cells.push(DayCell { date, in_displayed_month: true, is_today: date == today, events });
        }
        for offset in 1..=trailing {
            cells.push(outside_cell(last + Duration::days(offset)));
        }

        Self { month, today, cells }
    }

    pub fn month(&self) -> DisplayedMonth { self.month }
    pub fn cells(&self) -> &[DayCell]     { &self.cells }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    /// Today, if it is in the displayed month
    pub fn today_marker(&self) -> Option<NaiveDate> {
        Some(self.today).filter(|today| self.month.contains(*today))
    }

    /// The cell of a day of the displayed month
    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.cells.iter()
            .find(|cell| cell.in_displayed_month && cell.day() == day)
    }
}

fn outside_cell(date: NaiveDate) -> DayCell {
    DayCell { date, in_displayed_month: false, is_today: false, events: Vec::new() }
}
