//! Errors returned by the event stores and the calendar controller

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while talking to an event store or driving the calendar
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalendarError {
    /// The request could not be sent, timed out, or the store answered with a non-2xx status.
    ///
    /// `status` is `None` when no HTTP response was received at all.
    #[error("{}", describe_transport(.status, .message))]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },

    /// A local precondition failed. Nothing has been sent to the store.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The date/time of an event cannot be understood
    #[error("Malformed date for event {event}: {reason}")]
    MalformedData { event: String, reason: String },

    /// Another mutation is still waiting for the store
    #[error("Another request is still pending")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_transport(status: &Option<StatusCode>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP error! status: {} ({})", status, message),
        None => format!("Request failed: {}", message),
    }
}

impl CalendarError {
    pub fn transport<S: ToString>(status: Option<StatusCode>, message: S) -> Self {
        Self::Transport { status, message: message.to_string() }
    }

    pub fn validation<S: ToString>(message: S) -> Self {
        Self::Validation(message.to_string())
    }

    /// The HTTP status that caused this error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.status(), err)
    }
}

impl From<url::ParseError> for CalendarError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {}", err))
    }
}

pub type CalendarResult<T> = Result<T, CalendarError>;
