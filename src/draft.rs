//! The content of the event dialog

use chrono::{NaiveDate, NaiveTime};

use crate::error::{CalendarError, CalendarResult};
use crate::event::{CalendarEvent, EventId};
use crate::when;

/// Whether the dialog creates a new event or edits an existing one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

/// What the user is typing in the event dialog
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
    pub color: String,
}

impl EventDraft {
    /// An empty draft for a new event
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            title: String::new(),
            date,
            time,
            description: String::new(),
            color: crate::config::default_color(),
        }
    }

    /// A draft pre-filled with an existing event.
    /// Fails if the event has no usable date.
    pub fn from_event(event: &CalendarEvent) -> CalendarResult<Self> {
        let (date, time) = event.normalized()?;
        let color = match event.color().trim() {
            "" => crate::config::default_color(),
            color => color.to_string(),
        };

        Ok(Self {
            title: event.title().to_string(),
            date,
            time,
            description: event.description().to_string(),
            color,
        })
    }

    /// Build a draft from the raw values of form fields (`YYYY-MM-DD` and `HH:MM`)
    pub fn from_form(title: &str, date: &str, time: &str, description: &str, color: &str) -> CalendarResult<Self> {
        let date = when::parse_date(date)
            .ok_or_else(|| CalendarError::validation(format!("invalid date {:?}", date)))?;
        let time = when::parse_time(time)
            .ok_or_else(|| CalendarError::validation(format!("invalid time {:?}", time)))?;

        Ok(Self {
            title: title.to_string(),
            date,
            time,
            description: description.to_string(),
            color: color.to_string(),
        })
    }

    /// Check the draft, and turn it into the event to send to the store.
    ///
    /// The title must not be blank, and the color must be a valid CSS color (it is sent as a lower-case hex string).
    pub fn to_event(&self, id: Option<EventId>) -> CalendarResult<CalendarEvent> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CalendarError::validation("please enter a title for the event"));
        }

        let color = match self.color.trim() {
            "" => crate::config::default_color(),
            color => csscolorparser::parse(color)
                .map_err(|err| CalendarError::validation(format!("invalid color {:?}: {}", color, err)))?
                .to_hex_string(),
        };

        let mut event = CalendarEvent::new(title, self.date, self.time)
            .with_description(self.description.trim())
            .with_color(color);
        event.set_id(id);
        Ok(event)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn draft() -> EventDraft {
        EventDraft::from_form("  Lunch ", "2024-03-05", "12:00", " with Ana ", "#3A86FF").unwrap()
    }

    #[test]
    fn drafts_become_events() {
        let event = draft().to_event(None).unwrap();
        assert_eq!(event.id(), None);
        assert_eq!(event.title(), "Lunch");
        assert_eq!(event.description(), "with Ana");
        assert_eq!(event.color(), "#3a86ff");
        assert_eq!(event.when().to_wire(), (Some("2024-03-05".to_string()), Some("12:00".to_string())));

        let event = draft().to_event(Some(EventId::from("abc"))).unwrap();
        assert_eq!(event.id(), Some(&EventId::from("abc")));
    }

    #[test]
    fn blank_titles_are_refused() {
        let mut blank = draft();
        blank.title = "   ".to_string();
        assert!(matches!(blank.to_event(None), Err(CalendarError::Validation(_))));
    }

    #[test]
    fn colors_are_checked() {
        let mut named = draft();
        named.color = "red".to_string();
        assert_eq!(named.to_event(None).unwrap().color(), "#ff0000");

        let mut invalid = draft();
        invalid.color = "#zzzzzz".to_string();
        assert!(matches!(invalid.to_event(None), Err(CalendarError::Validation(_))));
    }

    #[test]
    fn form_values_are_checked() {
        assert!(EventDraft::from_form("x", "05/03/2024", "12:00", "", "").is_err());
        assert!(EventDraft::from_form("x", "2024-03-05", "noon", "", "").is_err());
    }
}
