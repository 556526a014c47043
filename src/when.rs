//! Dates and times of calendar events
//!
//! The store has been sending two shapes over its lifetime:
//! * a calendar date (`YYYY-MM-DD`) with a separate time of day (`HH:MM` or `HH:MM:SS`). This is the current shape, and the only one this crate writes.
//! * a single ISO 8601 timestamp in the `date` field (legacy records).
//!
//! Both are parsed into a [`When`] as soon as an event is read, so that the rest of the crate only deals with a `(NaiveDate, NaiveTime)` pair.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];


/// The date and time of an event, in whichever shape it was received
#[derive(Clone, Debug, PartialEq)]
pub enum When {
    /// A calendar date and a time of day
    Split { date: NaiveDate, time: NaiveTime },
    /// A legacy combined timestamp, already converted to local time
    Combined(NaiveDateTime),
    /// Something that cannot be placed on a calendar. The raw values are kept so that they can be written back untouched.
    Malformed { date: Option<String>, time: Option<String>, reason: String },
}

impl When {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self::Split { date, time }
    }

    /// Parse the `date` and `time` fields of an event
    pub fn from_wire(date: Option<&str>, time: Option<&str>) -> Self {
        let raw_date = date.map(str::trim).filter(|d| !d.is_empty());
        let raw_time = time.map(str::trim).filter(|t| !t.is_empty());

        let malformed = |reason: String| Self::Malformed {
            date: date.map(String::from),
            time: time.map(String::from),
            reason,
        };

        let raw_date = match raw_date {
            None => return malformed("missing date".to_string()),
            Some(d) => d,
        };

        let time = match raw_time.map(parse_time) {
            None => None,
            Some(Some(t)) => Some(t),
            Some(None) => return malformed(format!("invalid time {:?}", raw_time.unwrap_or_default())),
        };

        if let Ok(date) = NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
            // The time is optional in the store
            return Self::Split { date, time: time.unwrap_or(NaiveTime::MIN) };
        }

        match parse_timestamp(raw_date) {
            None => malformed(format!("invalid date {:?}", raw_date)),
            // Some serializers render a plain date column as a midnight timestamp. In that case the separate time field is authoritative, and so is the date as written.
            Some((as_written, _)) if time.is_some() => Self::Split {
                date: as_written.date(),
                time: time.unwrap_or(NaiveTime::MIN),
            },
            Some((_, local)) => Self::Combined(local),
        }
    }

    /// The canonical `(date, time)` pair, or `None` when this cannot be placed on a calendar
    pub fn normalized(&self) -> Option<(NaiveDate, NaiveTime)> {
        match self {
            Self::Split { date, time } => Some((*date, *time)),
            Self::Combined(datetime) => Some((datetime.date(), datetime.time())),
            Self::Malformed { .. } => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.normalized().map(|(date, _)| date)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Why this cannot be placed on a calendar, if it cannot
    pub fn malformation(&self) -> Option<&str> {
        match self {
            Self::Malformed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The `date` and `time` fields to send to the store
    pub fn to_wire(&self) -> (Option<String>, Option<String>) {
        match (self.normalized(), self) {
            (Some((date, time)), _) => (Some(format_date(date)), Some(format_time(time))),
            (None, Self::Malformed { date, time, .. }) => (date.clone(), time.clone()),
            (None, _) => (None, None),
        }
    }
}

impl Display for When {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.normalized() {
            Some((date, time)) => write!(f, "{} {}", format_date(date), format_time(time)),
            None => write!(f, "<{}>", self.malformation().unwrap_or("no date")),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `HH:MM`, or `HH:MM:SS` when the seconds matter
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS.iter()
        .find_map(|format| NaiveTime::parse_from_str(text.trim(), format).ok())
}

/// Returns the timestamp as it is written, and converted to local time
fn parse_timestamp(text: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let with_offset = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text));
    if let Ok(datetime) = with_offset {
        return Some((datetime.naive_local(), datetime.with_timezone(&Local).naive_local()));
    }

    NAIVE_TIMESTAMP_FORMATS.iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| (naive, naive))
}
