//! The presentation layer, as seen from this crate
//!
//! This crate does not draw anything. A UI implements [`Presenter`], and [`render`] tells it what to draw.

use crate::draft::{DialogMode, EventDraft};
use crate::event::CalendarEvent;
use crate::grid::MonthGrid;
use crate::status::StatusLevel;

pub trait Presenter {
    /// Draw the day cells of a month (the grid knows which cell is today)
    fn render_grid(&mut self, grid: &MonthGrid);
    /// Draw an event in the cell of its day. This is called after `render_grid`, for every placed event
    fn render_event_chip(&mut self, event: &CalendarEvent);

    fn show_dialog(&mut self, mode: DialogMode, draft: &EventDraft);
    fn hide_dialog(&mut self);

    fn show_status(&mut self, message: &str, level: StatusLevel);
    /// Ask the user a yes/no question
    fn confirm(&mut self, message: &str) -> bool;
}

/// Draw a month grid: the cells first, then the events of every day of the displayed month
pub fn render<P: Presenter + ?Sized>(presenter: &mut P, grid: &MonthGrid) {
    presenter.render_grid(grid);
    for cell in grid.cells() {
        for event in cell.events() {
            presenter.render_event_chip(event);
        }
    }
}
