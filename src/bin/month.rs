//! Prints a month of the remote calendar in the terminal.
//!
//! Usage: `month [YYYY-MM]`. The store address is read from `WALL_CALENDAR_API_URL` (default: `http://localhost:5000`).

use chrono::Local;

use wall_calendar::client::Client;
use wall_calendar::grid::MonthGrid;
use wall_calendar::presenter::Presenter;
use wall_calendar::status::StatusLevel;
use wall_calendar::{CalendarEvent, CalendarWidget, DialogMode, DisplayedMonth, EventDraft};

/// A presenter that writes to stdout, and never gets dialogs
struct TextPresenter;

impl Presenter for TextPresenter {
    fn render_grid(&mut self, grid: &MonthGrid) {
        println!("{:^34}", grid.month().to_string());
        println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
        for week in grid.weeks() {
            let line: Vec<String> = week.iter()
                .map(|cell| {
                    let marker = if cell.is_today() { '*' } else if cell.events().is_empty() { ' ' } else { '+' };
                    if cell.in_displayed_month() {
                        format!(" {:>2}{} ", cell.day(), marker)
                    } else {
                        "     ".to_string()
                    }
                })
                .collect();
            println!("{}", line.join(""));
        }
        println!();
    }

    fn render_event_chip(&mut self, event: &CalendarEvent) {
        println!("  {}  {}", event.when(), event.title());
    }

    fn show_dialog(&mut self, _mode: DialogMode, _draft: &EventDraft) {}
    fn hide_dialog(&mut self) {}

    fn show_status(&mut self, message: &str, level: StatusLevel) {
        eprintln!("[{:?}] {}", level, message);
    }

    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}


#[tokio::main]
async fn main() {
    env_logger::init();

    let client = match Client::from_env() {
        Ok(client) => client,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        },
    };

    let mut widget = CalendarWidget::new(client, TextPresenter);

    if let Some(arg) = std::env::args().nth(1) {
        let month = chrono::NaiveDate::parse_from_str(&format!("{}-01", arg), "%Y-%m-%d")
            .ok()
            .map(DisplayedMonth::containing);
        match month {
            Some(month) => widget.controller().go_to(month),
            None => log::warn!("Invalid month {:?} (expected YYYY-MM), showing {}", arg, Local::now().format("%B %Y")),
        }
    }

    if widget.start().await.is_err() {
        std::process::exit(2);
    }
}
