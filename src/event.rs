//! Calendar events, as stored by the event store

use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalendarError, CalendarResult};
use crate::when::When;

/// The identifier the store gives to an event.
///
/// The reference store uses UUID strings, older stores used numbers. Both are opaque to this crate, and are sent back in the shape they were received.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self { EventId::Text(s.to_string()) }
}
impl From<String> for EventId {
    fn from(s: String) -> Self { EventId::Text(s) }
}
impl From<i64> for EventId {
    fn from(n: i64) -> Self { EventId::Number(n) }
}


/// A calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "IncomingEvent", into = "OutgoingEvent")]
pub struct CalendarEvent {
    /// `None` until the store has created this event
    id: Option<EventId>,
    title: String,
    when: When,
    description: String,
    /// A CSS hex color
    color: String,
}

impl CalendarEvent {
    /// Create a brand new event, that is not in the store yet
    pub fn new<S: ToString>(title: S, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            when: When::new(date, time),
            description: String::new(),
            color: crate::config::default_color(),
        }
    }

    pub fn with_id<I: Into<EventId>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }
    pub fn with_when(mut self, when: When) -> Self {
        self.when = when;
        self
    }
    pub fn with_description<S: ToString>(mut self, description: S) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn with_color<S: ToString>(mut self, color: S) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn id(&self) -> Option<&EventId> { self.id.as_ref() }
    pub fn title(&self) -> &str          { &self.title       }
    pub fn when(&self) -> &When          { &self.when        }
    pub fn description(&self) -> &str    { &self.description }
    pub fn color(&self) -> &str          { &self.color       }

    pub fn set_id(&mut self, id: Option<EventId>) {
        self.id = id;
    }

    /// The date and time this event should be displayed at
    pub fn normalized(&self) -> CalendarResult<(NaiveDate, NaiveTime)> {
        self.when.normalized().ok_or_else(|| CalendarError::MalformedData {
            event: self.label(),
            reason: self.when.malformation().unwrap_or("no date").to_string(),
        })
    }

    /// The calendar date of this event, if it has a usable one
    pub fn date(&self) -> Option<NaiveDate> {
        self.when.date()
    }

    /// A short human-readable way to designate this event in logs and messages
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{:?} ({})", self.title, id),
            None => format!("{:?}", self.title),
        }
    }
}


/// What the store sends. Every field is optional, so that a single odd record does not prevent reading the others.
#[derive(Deserialize)]
struct IncomingEvent {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default, alias = "desc")]
    description: Option<Value>,
    #[serde(default)]
    color: Option<Value>,
}

/// What the store expects: always a `date` + `time` pair
#[derive(Serialize)]
struct OutgoingEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<EventId>,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    description: String,
    color: String,
}

fn value_as_text(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Only strings and integers are IDs. Anything else is dropped, so that the rest of the record can still be displayed.
fn value_as_id(value: &Option<Value>) -> Option<EventId> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(EventId::Text(s.clone())),
        Some(Value::Number(n)) => Some(match n.as_i64() {
            Some(n) => EventId::Number(n),
            None => EventId::Text(n.to_string()),
        }),
        Some(other) => {
            log::warn!("Ignoring an invalid event ID from the store: {}", other);
            None
        },
    }
}

impl From<IncomingEvent> for CalendarEvent {
    fn from(incoming: IncomingEvent) -> Self {
        let date = value_as_text(&incoming.date);
        let time = value_as_text(&incoming.time);
        let color = value_as_text(&incoming.color)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(crate::config::default_color);

        Self {
            id: value_as_id(&incoming.id),
            title: value_as_text(&incoming.title).unwrap_or_default(),
            when: When::from_wire(date.as_deref(), time.as_deref()),
            description: value_as_text(&incoming.description).unwrap_or_default(),
            color,
        }
    }
}

impl From<CalendarEvent> for OutgoingEvent {
    fn from(event: CalendarEvent) -> Self {
        let (date, time) = event.when.to_wire();
        Self {
            id: event.id,
            title: event.title,
            date,
            time,
            description: event.description,
            color: event.color,
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_current_shape() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": 1, "title": "Standup", "date": "2024-03-05", "time": "09:00:00", "color": "#3a86ff"
        })).unwrap();

        assert_eq!(event.id(), Some(&EventId::Number(1)));
        assert_eq!(event.title(), "Standup");
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(event.description(), "");
        assert_eq!(event.color(), "#3a86ff");
    }

    #[test]
    fn read_legacy_shape() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": 1709630000000i64, "title": "Dentist", "date": "2024-03-05T16:45:00", "desc": "bring the card"
        })).unwrap();

        assert_eq!(event.normalized().unwrap(), (
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveTime::from_hms_opt(16, 45, 0).unwrap(),
        ));
        assert_eq!(event.description(), "bring the card");
        assert_eq!(event.color(), crate::config::default_color());
    }

    #[test]
    fn malformed_records_are_still_read() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": "abc", "title": "Broken", "date": 20240305, "time": null
        })).unwrap();

        assert!(event.when().is_malformed());
        assert!(matches!(event.normalized(), Err(CalendarError::MalformedData { .. })));
    }

    #[test]
    fn odd_fields_do_not_hide_the_record() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": true, "title": 123, "date": "2024-03-05", "time": "09:00", "description": ["x"], "color": null
        })).unwrap();

        assert_eq!(event.id(), None);
        assert_eq!(event.title(), "123");
        assert_eq!(event.description(), r#"["x"]"#);
        assert_eq!(event.color(), crate::config::default_color());
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn writes_date_and_time_separately() {
        let event = CalendarEvent::new(
            "Lunch",
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({
            "title": "Lunch", "date": "2024-03-05", "time": "12:00", "description": "", "color": "#3a86ff"
        }));

        let value = serde_json::to_value(&event.with_id("e-42")).unwrap();
        assert_eq!(value["id"], json!("e-42"));
    }
}
